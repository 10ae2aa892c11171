//! Gmail API response normalization
//!
//! Converts a Gmail message into the [`InboundMessage`] the reply
//! decision operates on. Extraction fails closed: a message whose
//! sender cannot be determined is an error, and callers must skip it
//! rather than guess a recipient.

use anyhow::{Context, Result};

use super::api::{GmailMessage, MessagePayload};
use crate::models::{InboundMessage, MessageId};

/// Normalize a Gmail API message for classification
///
/// # Errors
/// Fails if the message has no payload or no usable `From` header.
/// A missing `Subject` is tolerated and becomes the empty string.
pub fn normalize_inbound(gmail_msg: GmailMessage) -> Result<InboundMessage> {
    let payload = gmail_msg
        .payload
        .as_ref()
        .context("Message has no payload")?;

    let sender = extract_header(payload, "From")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .context("Message has no From header")?;

    let subject = extract_header(payload, "Subject").unwrap_or_default();

    // An In-Reply-To header marks the message as part of an existing
    // reply thread; those never get an auto-reply.
    let has_prior_reply = extract_header(payload, "In-Reply-To").is_some();

    Ok(InboundMessage {
        id: MessageId::new(gmail_msg.id),
        sender,
        subject,
        has_prior_reply,
    })
}

/// Extract a header value by name
fn extract_header(payload: &MessagePayload, name: &str) -> Option<String> {
    payload.headers.as_ref()?.iter().find_map(|h| {
        if h.name.eq_ignore_ascii_case(name) {
            Some(h.value.clone())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gmail::api::Header;

    fn make_message(headers: Vec<(&str, &str)>) -> GmailMessage {
        GmailMessage {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            label_ids: None,
            snippet: None,
            payload: Some(MessagePayload {
                headers: Some(
                    headers
                        .into_iter()
                        .map(|(n, v)| Header {
                            name: n.to_string(),
                            value: v.to_string(),
                        })
                        .collect(),
                ),
                mime_type: None,
            }),
        }
    }

    #[test]
    fn test_normalize_basic_message() {
        let msg = make_message(vec![
            ("From", "Jane Doe <jane@example.com>"),
            ("Subject", "Quick question"),
        ]);

        let inbound = normalize_inbound(msg).unwrap();
        assert_eq!(inbound.id.as_str(), "m1");
        assert_eq!(inbound.sender, "Jane Doe <jane@example.com>");
        assert_eq!(inbound.subject, "Quick question");
        assert!(!inbound.has_prior_reply);
    }

    #[test]
    fn test_normalize_detects_prior_reply() {
        let msg = make_message(vec![
            ("From", "jane@example.com"),
            ("Subject", "Re: Quick question"),
            ("In-Reply-To", "<abc@mail.example.com>"),
        ]);

        assert!(normalize_inbound(msg).unwrap().has_prior_reply);
    }

    #[test]
    fn test_normalize_missing_from_fails() {
        let msg = make_message(vec![("Subject", "No sender")]);
        assert!(normalize_inbound(msg).is_err());
    }

    #[test]
    fn test_normalize_blank_from_fails() {
        let msg = make_message(vec![("From", "   "), ("Subject", "Blank sender")]);
        assert!(normalize_inbound(msg).is_err());
    }

    #[test]
    fn test_normalize_missing_payload_fails() {
        let msg = GmailMessage {
            id: "m1".to_string(),
            thread_id: "t1".to_string(),
            label_ids: None,
            snippet: None,
            payload: None,
        };
        assert!(normalize_inbound(msg).is_err());
    }

    #[test]
    fn test_normalize_missing_subject_is_empty() {
        let msg = make_message(vec![("From", "jane@example.com")]);
        assert_eq!(normalize_inbound(msg).unwrap().subject, "");
    }

    #[test]
    fn test_normalize_headers_case_insensitive() {
        let msg = make_message(vec![("FROM", "jane@example.com"), ("subject", "Hi")]);
        let inbound = normalize_inbound(msg).unwrap();
        assert_eq!(inbound.sender, "jane@example.com");
        assert_eq!(inbound.subject, "Hi");
    }

    #[test]
    fn test_normalize_trims_sender() {
        let msg = make_message(vec![("From", "  jane@example.com  ")]);
        assert_eq!(normalize_inbound(msg).unwrap().sender, "jane@example.com");
    }
}
