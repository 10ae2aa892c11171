//! Auto-reply construction
//!
//! Pure transformation from an inbound message and the configured body
//! template to an [`OutgoingReply`]; the original message is untouched.

use crate::models::{InboundMessage, OutgoingReply};

/// Build the auto-reply for a message
///
/// Recipient is the original sender, subject is `Re: ` + the original
/// subject, and the body is the configured template verbatim.
pub fn compose(original: &InboundMessage, body_template: &str) -> OutgoingReply {
    OutgoingReply {
        to: original.sender.clone(),
        subject: format!("Re: {}", original.subject),
        body: body_template.to_string(),
    }
}
