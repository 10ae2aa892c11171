//! Gmail API HTTP client
//!
//! Provides the mailbox operations the responder needs: candidate
//! listing, metadata fetch, sending, and label management.
//! Uses synchronous HTTP (ureq) to be executor-agnostic; every call
//! goes through a shared agent with a global timeout so a stalled
//! request surfaces as a per-message failure instead of hanging a cycle.

use anyhow::{Context, Result};
use std::time::Duration;

use super::GmailAuth;
use super::api::{
    CreateLabelRequest, GmailLabel, GmailMessage, ListLabelsResponse, ListMessagesResponse,
    ModifyMessageRequest, SendMessageRequest,
};
use crate::models::{LabelId, MessageId, OutgoingReply};

/// Error indicating a label with the requested name already exists
#[derive(Debug, thiserror::Error)]
#[error("Label already exists")]
pub struct LabelExistsError;

/// Gmail API client
pub struct GmailClient {
    auth: GmailAuth,
    agent: ureq::Agent,
}

impl GmailClient {
    /// Gmail API base URL
    const BASE_URL: &'static str = "https://gmail.googleapis.com/gmail/v1";

    /// Upper bound on any single API call
    const CALL_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a new Gmail client
    pub fn new(auth: GmailAuth) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Self::CALL_TIMEOUT))
            .build()
            .new_agent();
        Self { auth, agent }
    }

    fn bearer(&self) -> Result<String> {
        let access_token = self.auth.get_access_token()?;
        Ok(format!("Bearer {}", access_token))
    }

    /// List message IDs matching a Gmail search query
    ///
    /// # Arguments
    /// * `query` - Gmail search query (e.g. `category:primary is:unread`)
    /// * `max_results` - Maximum number of messages to return (1-500)
    pub fn list_messages(&self, query: &str, max_results: usize) -> Result<ListMessagesResponse> {
        let url = format!(
            "{}/users/me/messages?q={}&maxResults={}",
            Self::BASE_URL,
            urlencoding::encode(query),
            max_results.min(500)
        );

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send list messages request")?;

        let list: ListMessagesResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse list messages response")?;

        Ok(list)
    }

    /// Get message metadata by ID
    ///
    /// Fetches only the headers the reply decision needs
    /// (`From`, `Subject`, `In-Reply-To`), not the message body.
    pub fn get_message_metadata(&self, id: &MessageId) -> Result<GmailMessage> {
        let url = format!(
            "{}/users/me/messages/{}?format=metadata\
             &metadataHeaders=From&metadataHeaders=Subject&metadataHeaders=In-Reply-To",
            Self::BASE_URL,
            id.as_str()
        );

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send get message request")?;

        let message: GmailMessage = response
            .body_mut()
            .read_json()
            .context("Failed to parse message response")?;

        Ok(message)
    }

    /// Send an auto-reply through the Gmail send endpoint
    pub fn send_message(&self, reply: &OutgoingReply) -> Result<()> {
        let url = format!("{}/users/me/messages/send", Self::BASE_URL);
        let request = SendMessageRequest {
            raw: reply.to_raw(),
        };

        self.agent
            .post(&url)
            .header("Authorization", &self.bearer()?)
            .send_json(&request)
            .with_context(|| format!("Failed to send reply to {}", reply.to))?;

        Ok(())
    }

    /// Add a label to a message
    pub fn add_label(&self, id: &MessageId, label: &LabelId) -> Result<()> {
        let url = format!(
            "{}/users/me/messages/{}/modify",
            Self::BASE_URL,
            id.as_str()
        );
        let request = ModifyMessageRequest {
            add_label_ids: vec![label.as_str().to_string()],
            remove_label_ids: vec![],
        };

        self.agent
            .post(&url)
            .header("Authorization", &self.bearer()?)
            .send_json(&request)
            .with_context(|| format!("Failed to label message {}", id.as_str()))?;

        Ok(())
    }

    // === Labels API ===

    /// List all labels in the user's mailbox
    pub fn list_labels(&self) -> Result<Vec<GmailLabel>> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);

        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", &self.bearer()?)
            .call()
            .context("Failed to send list labels request")?;

        let labels: ListLabelsResponse = response
            .body_mut()
            .read_json()
            .context("Failed to parse labels response")?;

        Ok(labels.labels.unwrap_or_default())
    }

    /// Create a user label, shown in both the label and message lists
    ///
    /// # Errors
    /// Returns [`LabelExistsError`] if Gmail reports a name conflict (409).
    pub fn create_label(&self, name: &str) -> Result<LabelId> {
        let url = format!("{}/users/me/labels", Self::BASE_URL);
        let request = CreateLabelRequest {
            name: name.to_string(),
            label_list_visibility: "labelShow".to_string(),
            message_list_visibility: "show".to_string(),
        };

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.bearer()?)
            .send_json(&request);

        match response {
            Ok(mut resp) => {
                let label: GmailLabel = resp
                    .body_mut()
                    .read_json()
                    .context("Failed to parse create label response")?;
                Ok(LabelId::new(label.id))
            }
            Err(ureq::Error::StatusCode(409)) => Err(LabelExistsError.into()),
            Err(e) => Err(anyhow::anyhow!("Failed to create label: {}", e)),
        }
    }

    /// Resolve the ID of a label by name, creating it if absent
    ///
    /// Idempotent: if creation reports a conflict, the existing label
    /// is looked up by name instead.
    pub fn ensure_label(&self, name: &str) -> Result<LabelId> {
        match self.create_label(name) {
            Ok(id) => Ok(id),
            Err(e) if e.downcast_ref::<LabelExistsError>().is_some() => {
                let labels = self.list_labels()?;
                find_label_id(&labels, name)
                    .with_context(|| format!("Label '{}' reported as existing but not found", name))
            }
            Err(e) => Err(e),
        }
    }

    /// Trigger authentication flow
    pub fn authenticate(&self) -> Result<()> {
        self.auth.get_access_token()?;
        Ok(())
    }
}

/// Find a label's ID by exact name
fn find_label_id(labels: &[GmailLabel], name: &str) -> Option<LabelId> {
    labels
        .iter()
        .find(|l| l.name == name)
        .map(|l| LabelId::new(l.id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_labels() -> Vec<GmailLabel> {
        vec![
            GmailLabel {
                id: "INBOX".to_string(),
                name: "INBOX".to_string(),
            },
            GmailLabel {
                id: "Label_42".to_string(),
                name: "Vacation Auto-Replies".to_string(),
            },
        ]
    }

    #[test]
    fn test_find_label_id() {
        let labels = make_labels();
        assert_eq!(
            find_label_id(&labels, "Vacation Auto-Replies"),
            Some(LabelId::new("Label_42"))
        );
        assert_eq!(find_label_id(&labels, "Nonexistent"), None);
    }

    #[test]
    fn test_find_label_id_is_exact_match() {
        let labels = make_labels();
        assert_eq!(find_label_id(&labels, "vacation auto-replies"), None);
    }

    #[test]
    fn test_label_exists_error_is_distinguishable() {
        let err: anyhow::Error = LabelExistsError.into();
        assert!(err.downcast_ref::<LabelExistsError>().is_some());
    }
}
