//! Mailbox gateway trait
//!
//! Abstracts the Gmail operations a cycle performs so the decision
//! logic can be exercised against a scripted mailbox in tests.

use anyhow::Result;

use crate::gmail::GmailClient;
use crate::gmail::api::{GmailMessage, MessageRef};
use crate::models::{LabelId, MessageId, OutgoingReply};

/// Candidates fetched per cycle; one poll never needs more
const MAX_CANDIDATES: usize = 100;

/// The mailbox operations one poll cycle consumes
pub trait MailGateway: Send + Sync {
    /// List candidate messages matching a Gmail search query,
    /// in the order the mailbox returns them
    fn list_candidates(&self, query: &str) -> Result<Vec<MessageRef>>;

    /// Fetch the headers of a single message
    fn fetch_message(&self, id: &MessageId) -> Result<GmailMessage>;

    /// Send an auto-reply
    fn send_reply(&self, reply: &OutgoingReply) -> Result<()>;

    /// Apply a label to a message
    fn apply_label(&self, id: &MessageId, label: &LabelId) -> Result<()>;
}

impl MailGateway for GmailClient {
    fn list_candidates(&self, query: &str) -> Result<Vec<MessageRef>> {
        let response = self.list_messages(query, MAX_CANDIDATES)?;
        Ok(response.messages.unwrap_or_default())
    }

    fn fetch_message(&self, id: &MessageId) -> Result<GmailMessage> {
        self.get_message_metadata(id)
    }

    fn send_reply(&self, reply: &OutgoingReply) -> Result<()> {
        self.send_message(reply)
    }

    fn apply_label(&self, id: &MessageId, label: &LabelId) -> Result<()> {
        self.add_label(id, label)
    }
}
