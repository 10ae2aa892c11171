//! Configuration for the auto-responder
//!
//! Two config files live in ~/.config/autoreply/:
//! - `google-credentials.json` — OAuth client credentials in the Google
//!   Cloud Console format (also loadable from compile-time or runtime
//!   environment variables)
//! - `responder.json` — responder behavior settings; written with
//!   defaults on first run so the operator has a file to edit

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Credentials filename in the config directory
const CREDENTIALS_FILE: &str = "google-credentials.json";

/// Responder settings filename in the config directory
const SETTINGS_FILE: &str = "responder.json";

/// The daemon's config directory (~/.config/autoreply/)
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("autoreply"))
}

/// Path of a file inside the config directory
pub fn config_path(filename: &str) -> Option<PathBuf> {
    config_dir().map(|d| d.join(filename))
}

/// Create the config directory if it does not exist yet.
/// Call once at daemon startup, before anything reads or writes config.
pub fn init() -> Result<PathBuf> {
    let dir = config_dir().context("Could not determine config directory")?;
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
    Ok(dir)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

/// OAuth credentials for Gmail API access
#[derive(Debug, Clone)]
pub struct GmailCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Google Cloud Console credential file format (installed app)
#[derive(Deserialize)]
struct GoogleCredentialFile {
    installed: Option<InstalledCredentials>,
    web: Option<InstalledCredentials>,
}

#[derive(Deserialize)]
struct InstalledCredentials {
    client_id: String,
    client_secret: String,
}

impl GmailCredentials {
    /// Load credentials using the following priority:
    /// 1. Compile-time embedded credentials (for production builds)
    /// 2. JSON file (~/.config/autoreply/google-credentials.json)
    /// 3. Runtime environment variables
    pub fn load() -> Result<Self> {
        // Try compile-time embedded credentials first (production builds)
        if let Some(creds) = Self::from_compile_time() {
            return Ok(creds);
        }

        // Try default config file
        if let Some(path) = config_path(CREDENTIALS_FILE)
            && path.exists()
        {
            let creds: GoogleCredentialFile = read_json(&path)?;
            return Self::from_credential_file(creds);
        }

        // Fall back to runtime environment variables
        Self::from_env()
    }

    /// Load credentials embedded at compile time via environment variables.
    /// Build with: GOOGLE_CLIENT_ID=xxx GOOGLE_CLIENT_SECRET=yyy cargo build --release
    pub fn from_compile_time() -> Option<Self> {
        let client_id = option_env!("GOOGLE_CLIENT_ID")?;
        let client_secret = option_env!("GOOGLE_CLIENT_SECRET")?;

        // Only return if both are non-empty
        if client_id.is_empty() || client_secret.is_empty() {
            return None;
        }

        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// Parse credentials from a GoogleCredentialFile
    fn from_credential_file(creds: GoogleCredentialFile) -> Result<Self> {
        // Support both "installed" (desktop) and "web" credential types
        let installed = creds
            .installed
            .or(creds.web)
            .context("Credentials file missing 'installed' or 'web' section")?;

        Ok(Self {
            client_id: installed.client_id,
            client_secret: installed.client_secret,
        })
    }

    /// Parse credentials from JSON string (Google Cloud Console format)
    pub fn from_json(json: &str) -> Result<Self> {
        let creds: GoogleCredentialFile =
            serde_json::from_str(json).context("Failed to parse credentials JSON")?;
        Self::from_credential_file(creds)
    }

    /// Load credentials from environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var("GMAIL_CLIENT_ID")
            .context("GMAIL_CLIENT_ID environment variable not set")?;
        let client_secret = std::env::var("GMAIL_CLIENT_SECRET")
            .context("GMAIL_CLIENT_SECRET environment variable not set")?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Get the default credentials file path
    /// (~/.config/autoreply/google-credentials.json)
    pub fn default_credentials_path() -> Option<PathBuf> {
        config_path(CREDENTIALS_FILE)
    }
}

/// Responder behavior settings
///
/// The reply body and filter query are configuration, not literals in
/// the code; `responder.json` carries exactly these recognized options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponderSettings {
    /// Gmail search query selecting candidate messages
    pub sender_filter_query: String,
    /// Plain-text body of every auto-reply
    pub reply_body_template: String,
    /// Name of the label applied to replied-to messages
    pub label_name: String,
    /// Nominal delay between poll cycles
    pub poll_interval_ms: u64,
    /// Jitter added to the delay, drawn once per process from
    /// [min, max] seconds inclusive
    pub jitter_range_seconds: (u64, u64),
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            sender_filter_query: "category:primary is:unread".to_string(),
            reply_body_template: "I'm currently on vacation and will reply to you when I return.\n\nThanks and Regards".to_string(),
            label_name: "Vacation Auto-Replies".to_string(),
            poll_interval_ms: 60_000,
            jitter_range_seconds: (45, 120),
        }
    }
}

impl ResponderSettings {
    /// Load settings from ~/.config/autoreply/responder.json
    ///
    /// A missing file is written with the defaults; a malformed file or
    /// invalid values are a startup error.
    pub fn load() -> Result<Self> {
        let path = config_path(SETTINGS_FILE).context("Could not determine config directory")?;
        Self::load_from(&path)
    }

    /// Load settings from a specific file, bootstrapping it with the
    /// defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = if path.exists() {
            read_json(path)?
        } else {
            let defaults = Self::default();
            write_json(path, &defaults)?;
            defaults
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check the settings for values the responder cannot run with
    pub fn validate(&self) -> Result<()> {
        let (min, max) = self.jitter_range_seconds;
        if min > max {
            bail!("jitterRangeSeconds: min {} exceeds max {}", min, max);
        }
        if self.poll_interval_ms == 0 {
            bail!("pollIntervalMs must be positive");
        }
        if self.label_name.trim().is_empty() {
            bail!("labelName must not be empty");
        }
        if self.sender_filter_query.trim().is_empty() {
            bail!("senderFilterQuery must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_under_app_dir() {
        let path = config_path("responder.json").unwrap();
        assert!(path.ends_with("autoreply/responder.json"));
    }

    #[test]
    fn test_parse_installed_credentials() {
        let json = r#"{
            "installed": {
                "client_id": "test-client-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;

        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-client-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn test_parse_web_credentials() {
        let json = r#"{
            "web": {
                "client_id": "web-client-id.apps.googleusercontent.com",
                "client_secret": "web-secret"
            }
        }"#;

        let creds = GmailCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-client-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "web-secret");
    }

    #[test]
    fn test_invalid_credentials_json() {
        let json = r#"{ "other": {} }"#;
        assert!(GmailCredentials::from_json(json).is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let settings = ResponderSettings::default();
        assert_eq!(settings.label_name, "Vacation Auto-Replies");
        assert_eq!(settings.poll_interval_ms, 60_000);
        assert_eq!(settings.jitter_range_seconds, (45, 120));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_first_run_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responder.json");

        let settings = ResponderSettings::load_from(&path).unwrap();
        assert_eq!(settings.label_name, ResponderSettings::default().label_name);

        // The bootstrapped file parses back to the same settings
        assert!(path.exists());
        let reloaded = ResponderSettings::load_from(&path).unwrap();
        assert_eq!(reloaded.poll_interval_ms, settings.poll_interval_ms);
    }

    #[test]
    fn test_settings_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("responder.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(ResponderSettings::load_from(&path).is_err());
    }

    #[test]
    fn test_settings_parse_camel_case() {
        let json = r#"{
            "senderFilterQuery": "from:boss@example.com is:unread",
            "replyBodyTemplate": "Out of office.",
            "labelName": "OOO",
            "pollIntervalMs": 30000,
            "jitterRangeSeconds": [5, 10]
        }"#;

        let settings: ResponderSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.sender_filter_query, "from:boss@example.com is:unread");
        assert_eq!(settings.reply_body_template, "Out of office.");
        assert_eq!(settings.label_name, "OOO");
        assert_eq!(settings.poll_interval_ms, 30_000);
        assert_eq!(settings.jitter_range_seconds, (5, 10));
    }

    #[test]
    fn test_settings_partial_file_uses_defaults() {
        let json = r#"{ "labelName": "OOO" }"#;
        let settings: ResponderSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.label_name, "OOO");
        assert_eq!(settings.poll_interval_ms, 60_000);
    }

    #[test]
    fn test_settings_reject_inverted_jitter_range() {
        let settings = ResponderSettings {
            jitter_range_seconds: (120, 45),
            ..ResponderSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_reject_zero_interval() {
        let settings = ResponderSettings {
            poll_interval_ms: 0,
            ..ResponderSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
