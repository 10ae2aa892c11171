//! The reply decision pipeline
//!
//! One cycle runs fetch → classify → act → record over the current
//! candidates: list matching messages, decide per message whether an
//! auto-reply is due, send and label it, and record the sender so it
//! is never contacted twice.

mod classify;
mod compose;
mod cycle;
mod gateway;

pub use classify::should_reply;
pub use compose::compose;
pub use cycle::{CycleStats, candidate_query, run_cycle};
pub use gateway::MailGateway;
