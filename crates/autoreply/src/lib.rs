//! Autoreply crate - vacation auto-responder core
//!
//! This crate provides platform-independent responder functionality:
//! - Domain models (InboundMessage, OutgoingReply, RepliedSet)
//! - Gmail API client and OAuth authentication
//! - Durable replied-sender storage (at most one reply per sender)
//! - The reply decision pipeline (classify, compose, cycle)
//! - The guarded polling supervisor and the inbound trigger endpoint
//!
//! This crate has no UI; the `autoreplyd` binary wires it together.

pub mod config;
pub mod gmail;
pub mod models;
pub mod responder;
pub mod scheduler;
pub mod storage;
pub mod trigger;

pub use config::{GmailCredentials, ResponderSettings};
pub use gmail::{GmailAuth, GmailClient, LabelExistsError, normalize_inbound};
pub use models::{InboundMessage, LabelId, MessageId, OutgoingReply};
pub use responder::{CycleStats, MailGateway, compose, run_cycle, should_reply};
pub use scheduler::Supervisor;
pub use storage::{RepliedSet, default_store_path};
