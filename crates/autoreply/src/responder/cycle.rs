//! One poll cycle: find candidates, decide, act, record

use anyhow::Result;
use log::{debug, error, info, warn};

use super::classify::should_reply;
use super::compose::compose;
use super::gateway::MailGateway;
use crate::config::ResponderSettings;
use crate::gmail::normalize_inbound;
use crate::models::{LabelId, MessageId};
use crate::storage::RepliedSet;

/// Recency window appended to the candidate query. Anything older has
/// either been handled in a previous cycle or predates the vacation.
const RECENCY_WINDOW_DAYS: u32 = 7;

/// Statistics from one poll cycle
#[derive(Debug, Default, Clone)]
pub struct CycleStats {
    /// Number of candidate messages returned by the mailbox query
    pub candidates: usize,
    /// Number of auto-replies sent
    pub replies_sent: usize,
    /// Candidates skipped because the sender was already replied to
    pub skipped_already_replied: usize,
    /// Candidates skipped because they are part of an existing thread
    pub skipped_thread_reply: usize,
    /// Candidates skipped because the sender could not be determined
    pub skipped_unparsable: usize,
    /// Number of per-message failures (fetch, send, label)
    pub errors: usize,
    /// Duration of the cycle
    pub duration_ms: u64,
}

/// Build the Gmail search query selecting current candidates
pub fn candidate_query(settings: &ResponderSettings) -> String {
    format!(
        "{} newer_than:{}d",
        settings.sender_filter_query.trim(),
        RECENCY_WINDOW_DAYS
    )
}

/// Execute one full poll cycle
///
/// Candidates are processed strictly sequentially, in the order the
/// mailbox returns them, and each message runs to completion
/// (send + label + record) before the next is started. A failure on
/// one message is logged and counted; it never aborts the rest of the
/// cycle. Only a failure of the candidate listing itself fails the
/// whole cycle.
pub fn run_cycle(
    gateway: &dyn MailGateway,
    replied: &mut RepliedSet,
    settings: &ResponderSettings,
    label_id: &LabelId,
) -> Result<CycleStats> {
    let start = std::time::Instant::now();
    let mut stats = CycleStats::default();

    let query = candidate_query(settings);
    debug!("Listing candidates: {}", query);
    let refs = gateway.list_candidates(&query)?;
    stats.candidates = refs.len();

    if refs.is_empty() {
        stats.duration_ms = start.elapsed().as_millis() as u64;
        return Ok(stats);
    }

    for msg_ref in &refs {
        let id = MessageId::new(&msg_ref.id);
        // Per-message failure boundary: one bad message must not starve
        // the remaining candidates in this cycle.
        if let Err(e) = respond_to(gateway, replied, settings, label_id, &id, &mut stats) {
            error!("Skipping message {}: {:#}", id.as_str(), e);
            stats.errors += 1;
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Cycle complete: {} candidates, {} replies sent, {} errors in {}ms",
        stats.candidates, stats.replies_sent, stats.errors, stats.duration_ms
    );
    Ok(stats)
}

/// Handle a single candidate to completion
fn respond_to(
    gateway: &dyn MailGateway,
    replied: &mut RepliedSet,
    settings: &ResponderSettings,
    label_id: &LabelId,
    id: &MessageId,
    stats: &mut CycleStats,
) -> Result<()> {
    let detail = gateway.fetch_message(id)?;

    let msg = match normalize_inbound(detail) {
        Ok(msg) => msg,
        Err(e) => {
            // Fail closed: replying to an unparsable sender is unsafe.
            warn!(
                "Cannot classify message {}; not replying: {:#}",
                id.as_str(),
                e
            );
            stats.skipped_unparsable += 1;
            return Ok(());
        }
    };

    if !should_reply(&msg, replied) {
        if replied.contains(&msg.sender) {
            debug!("Already replied to {}; skipping", msg.sender);
            stats.skipped_already_replied += 1;
        } else {
            debug!("Message {} is a thread reply; skipping", id.as_str());
            stats.skipped_thread_reply += 1;
        }
        return Ok(());
    }

    let reply = compose(&msg, &settings.reply_body_template);
    gateway.send_reply(&reply)?;
    info!("Sent auto-reply to {}", msg.sender);

    if let Err(e) = gateway.apply_label(&msg.id, label_id) {
        // The reply already went out; record the sender regardless so
        // it is never contacted twice.
        error!("Failed to label message {}: {:#}", msg.id.as_str(), e);
        stats.errors += 1;
    }

    replied.record(msg.sender);
    stats.replies_sent += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_query_appends_recency_window() {
        let settings = ResponderSettings::default();
        assert_eq!(
            candidate_query(&settings),
            "category:primary is:unread newer_than:7d"
        );
    }

    #[test]
    fn test_candidate_query_trims_filter() {
        let settings = ResponderSettings {
            sender_filter_query: "  from:boss@example.com is:unread ".to_string(),
            ..ResponderSettings::default()
        };
        assert_eq!(
            candidate_query(&settings),
            "from:boss@example.com is:unread newer_than:7d"
        );
    }
}
