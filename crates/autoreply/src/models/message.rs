//! Message models for the reply decision pipeline

use base64::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique identifier for a message (Gmail message ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An incoming message reduced to the fields the reply decision needs.
///
/// `sender` is the trimmed raw `From` header value and doubles as the
/// deduplication key; no display-name/address parsing is applied to it.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Gmail message ID
    pub id: MessageId,
    /// Raw `From` header value, trimmed
    pub sender: String,
    /// Subject line (empty if the header is missing)
    pub subject: String,
    /// Whether the message carries an `In-Reply-To` header,
    /// i.e. is itself part of an existing reply thread
    pub has_prior_reply: bool,
}

/// An outgoing auto-reply, ready to be encoded and sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingReply {
    /// Recipient, the original sender's raw `From` value
    pub to: String,
    /// Subject line (`Re: ` + original subject)
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

impl OutgoingReply {
    /// Render the reply as an RFC 2822 plain-text message
    pub fn to_rfc2822(&self) -> String {
        format!(
            "To: {}\r\n\
             Subject: {}\r\n\
             Content-Type: text/plain; charset=\"UTF-8\"\r\n\
             Content-Transfer-Encoding: 7bit\r\n\
             \r\n\
             {}",
            self.to, self.subject, self.body
        )
    }

    /// Encode the message for the Gmail send endpoint's `raw` field
    /// (URL-safe base64, no padding)
    pub fn to_raw(&self) -> String {
        BASE64_URL_SAFE_NO_PAD.encode(self.to_rfc2822())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_reply() -> OutgoingReply {
        OutgoingReply {
            to: "Jane Doe <jane@example.com>".to_string(),
            subject: "Re: Quick question".to_string(),
            body: "I'm away until Monday.".to_string(),
        }
    }

    #[test]
    fn test_rfc2822_layout() {
        let rendered = make_reply().to_rfc2822();
        assert!(rendered.starts_with("To: Jane Doe <jane@example.com>\r\n"));
        assert!(rendered.contains("Subject: Re: Quick question\r\n"));
        assert!(rendered.contains("Content-Type: text/plain; charset=\"UTF-8\"\r\n"));
        assert!(rendered.ends_with("\r\n\r\nI'm away until Monday."));
    }

    #[test]
    fn test_raw_round_trips() {
        let reply = make_reply();
        let decoded = BASE64_URL_SAFE_NO_PAD.decode(reply.to_raw()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), reply.to_rfc2822());
    }
}
