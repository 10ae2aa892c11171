//! The auto-reply decision
//!
//! Pure function of the message and the replied-sender set; no I/O.

use crate::models::InboundMessage;
use crate::storage::RepliedSet;

/// Decide whether an auto-reply is due for this message
///
/// True iff the sender has not been replied to before and the message
/// is not itself part of an existing reply thread.
pub fn should_reply(msg: &InboundMessage, replied: &RepliedSet) -> bool {
    !replied.contains(&msg.sender) && !msg.has_prior_reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageId;
    use tempfile::TempDir;

    fn make_message(sender: &str, has_prior_reply: bool) -> InboundMessage {
        InboundMessage {
            id: MessageId::new("m1"),
            sender: sender.to_string(),
            subject: "Hello".to_string(),
            has_prior_reply,
        }
    }

    fn make_replied(senders: &[&str]) -> (TempDir, RepliedSet) {
        let dir = TempDir::new().unwrap();
        let mut set = RepliedSet::load(dir.path().join("replied-senders.json"));
        for sender in senders {
            set.record(*sender);
        }
        (dir, set)
    }

    #[test]
    fn test_fresh_sender_gets_reply() {
        let (_dir, replied) = make_replied(&[]);
        assert!(should_reply(&make_message("x@y.com", false), &replied));
    }

    #[test]
    fn test_known_sender_is_skipped() {
        let (_dir, replied) = make_replied(&["x@y.com"]);
        assert!(!should_reply(&make_message("x@y.com", false), &replied));
    }

    #[test]
    fn test_thread_reply_is_skipped() {
        let (_dir, replied) = make_replied(&[]);
        assert!(!should_reply(&make_message("x@y.com", true), &replied));
    }

    #[test]
    fn test_sender_match_is_exact() {
        // Deduplication keys on the raw From value; a different display
        // name is a different sender.
        let (_dir, replied) = make_replied(&["Jane <x@y.com>"]);
        assert!(should_reply(&make_message("x@y.com", false), &replied));
    }
}
