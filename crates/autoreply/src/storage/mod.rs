//! Durable replied-sender storage
//!
//! A single JSON file holding the set of senders that have already
//! received an auto-reply. Full-file overwrite on every change; this
//! only stays cheap because the cardinality is small (the distinct
//! correspondents of one vacation period), and it is the documented
//! scaling limit of this store.

mod replied;

pub use replied::RepliedSet;

use std::path::PathBuf;

/// Filename of the replied-senders file in the config directory
pub const REPLIED_SENDERS_FILE: &str = "replied-senders.json";

/// Default path of the replied-senders file
/// (~/.config/autoreply/replied-senders.json)
pub fn default_store_path() -> Option<PathBuf> {
    crate::config::config_path(REPLIED_SENDERS_FILE)
}
