//! Translation-relay pipeline — the inbound and outbound message paths.

pub mod model;
pub mod pipeline;

pub use model::{
    DeliveryReceipt, InboundMessage, MessageStatus, OutboundReply, TranslationOutcome,
};
pub use pipeline::RelayPipeline;
