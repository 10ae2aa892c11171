//! Domain models for the auto-responder

mod label;
mod message;

pub use label::LabelId;
pub use message::{InboundMessage, MessageId, OutgoingReply};
