//! The replied-sender set and its JSON file persistence

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable set of senders that have already been auto-replied to
///
/// Membership means a reply has been sent during the process's
/// operational history; the set is consulted before every send so a
/// sender is contacted at most once, across restarts included.
#[derive(Debug)]
pub struct RepliedSet {
    senders: BTreeSet<String>,
    path: PathBuf,
}

impl RepliedSet {
    /// Load the set from its backing file
    ///
    /// On first run the file is created holding an empty collection
    /// before it is read. Missing or malformed content degrades to an
    /// empty set with a warning; loading never fails the caller.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            info!(
                "Replied-senders file {} does not exist; creating it empty",
                path.display()
            );
            if let Some(parent) = path.parent()
                && let Err(e) = fs::create_dir_all(parent)
            {
                warn!("Failed to create {}: {}", parent.display(), e);
            }
            if let Err(e) = fs::write(&path, "[]") {
                warn!("Failed to create {}: {}", path.display(), e);
            }
        }

        let senders = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeSet<String>>(&content) {
                Ok(senders) => senders,
                Err(e) => {
                    warn!(
                        "Replied-senders file {} is malformed, starting empty: {}",
                        path.display(),
                        e
                    );
                    BTreeSet::new()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read replied-senders file {}, starting empty: {}",
                    path.display(),
                    e
                );
                BTreeSet::new()
            }
        };

        info!(
            "Loaded {} replied senders from {}",
            senders.len(),
            path.display()
        );
        Self { senders, path }
    }

    /// Whether this sender has already received a reply
    pub fn contains(&self, sender: &str) -> bool {
        self.senders.contains(sender)
    }

    /// Record that a reply was sent to this sender
    ///
    /// No-op if the sender is already present. A new entry is persisted
    /// immediately; persistence failure is logged but non-fatal, and the
    /// in-memory set stays authoritative until the next successful persist.
    pub fn record(&mut self, sender: impl Into<String>) {
        if self.senders.insert(sender.into())
            && let Err(e) = self.persist()
        {
            error!(
                "Failed to persist replied senders (continuing with in-memory state): {:#}",
                e
            );
        }
    }

    /// Overwrite the backing file with the full current set
    pub fn persist(&self) -> Result<()> {
        let content = serde_json::to_string(&self.senders)
            .context("Failed to serialize replied senders")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_absent_file_bootstraps_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("replied-senders.json");

        let set = RepliedSet::load(&path);
        assert!(set.is_empty());

        // The empty collection is persisted before first read
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_load_malformed_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("replied-senders.json");
        fs::write(&path, "{not json").unwrap();

        let set = RepliedSet::load(&path);
        assert!(set.is_empty());
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("replied-senders.json");

        let mut set = RepliedSet::load(&path);
        set.record("a@example.com");
        set.record("b@example.com");

        let reloaded = RepliedSet::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("a@example.com"));
        assert!(reloaded.contains("b@example.com"));
        assert!(!reloaded.contains("c@example.com"));
    }

    #[test]
    fn test_record_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("replied-senders.json");

        let mut set = RepliedSet::load(&path);
        set.record("x@y.com");
        set.record("x@y.com");

        assert_eq!(set.len(), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"["x@y.com"]"#);
    }

    #[test]
    fn test_record_survives_unwritable_path() {
        let dir = TempDir::new().unwrap();

        // The directory itself is not a writable file, so every persist
        // attempt fails; in-memory state must stay authoritative.
        let mut set = RepliedSet::load(dir.path());
        set.record("x@y.com");

        assert!(set.contains("x@y.com"));
        assert_eq!(set.len(), 1);
        assert!(set.persist().is_err());
    }

    #[test]
    fn test_file_is_a_json_array_of_strings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("replied-senders.json");

        let mut set = RepliedSet::load(&path);
        set.record("b@example.com");
        set.record("a@example.com");

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, vec!["a@example.com", "b@example.com"]);
    }
}
