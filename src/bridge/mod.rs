//! Host bridge
//!
//! Hosts talk to the highlighter with JSON envelopes, one per line:
//! `{"type": "RDH_APPLY", "payload": [...]}`. This module decodes inbound
//! commands, keeps the ones that arrive before a document is loaded, and
//! encodes the events going back.

mod message;
mod queue;

pub use message::{
    Envelope, InboundCommand, OutboundEvent, ScrollPayload, SelectionPayload, ADD_SELECTION,
    APPLY, CONFIG, NOTE_SELECTION, READY, SCROLL, SELECTION,
};
pub use queue::Bridge;

use thiserror::Error;

/// Malformed inbound traffic. Always dropped, never fatal.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message has no string type")]
    MissingType,

    #[error("{0} payload must be an object or an array")]
    ScalarPayload(String),

    #[error("{0} requires a payload")]
    MissingPayload(String),

    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}
