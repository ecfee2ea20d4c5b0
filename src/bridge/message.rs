//! Wire messages

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::BridgeError;
use crate::controller::{Rect, SettingsUpdate};
use crate::highlight::{
    AddDetails, HighlightEvent, HighlightId, HighlightRecord, RemoveDetails, SelectionDetails,
    UpdateDetails,
};

pub const APPLY: &str = "RDH_APPLY";
pub const CONFIG: &str = "RDH_CONFIG";
pub const SCROLL: &str = "RDH_SCROLL";
pub const ADD_SELECTION: &str = "RDH_ADD_SELECTION";
pub const NOTE_SELECTION: &str = "RDH_NOTE_SELECTION";
pub const SELECTION: &str = "RDH_SELECTION";

pub const READY: &str = "RDH_READY";
pub const ADD: &str = "RDH_ADD";
pub const UPDATE: &str = "RDH_UPDATE";
pub const REMOVE: &str = "RDH_REMOVE";

/// `{type, payload?}` as sent over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Envelope {
    pub fn new(kind: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Parse one line. Payloads must be objects or arrays; `null` counts as
    /// absent.
    pub fn from_json(line: &str) -> Result<Self, BridgeError> {
        let Value::Object(mut fields) = serde_json::from_str::<Value>(line)? else {
            return Err(BridgeError::NotAnObject);
        };

        let kind = match fields.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(BridgeError::MissingType),
        };

        let payload = match fields.remove("payload") {
            None | Some(Value::Null) => None,
            Some(payload @ (Value::Object(_) | Value::Array(_))) => Some(payload),
            Some(_) => return Err(BridgeError::ScalarPayload(kind)),
        };

        Ok(Self { kind, payload })
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `RDH_SCROLL` payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScrollPayload {
    #[serde(alias = "_id")]
    pub id: HighlightId,
}

/// `RDH_SELECTION` payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SelectionPayload {
    pub text: String,
    #[serde(default)]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub focused: Option<bool>,
}

/// A well-typed command for the highlighter
#[derive(Debug, Clone, PartialEq)]
pub enum InboundCommand {
    Apply(Vec<HighlightRecord>),
    Configure(SettingsUpdate),
    ScrollTo(HighlightId),
    AddSelection(SelectionDetails),
    NoteSelection,
    Selection(SelectionPayload),
}

impl InboundCommand {
    /// Decode an envelope. Unknown types decode to `None`.
    pub fn decode(envelope: Envelope) -> Result<Option<Self>, BridgeError> {
        let Envelope { kind, payload } = envelope;

        let command = match kind.as_str() {
            APPLY => InboundCommand::Apply(match payload {
                Some(payload) => records(&kind, payload)?,
                None => Vec::new(),
            }),
            CONFIG => InboundCommand::Configure(match payload {
                Some(payload) => typed(&kind, payload)?,
                None => SettingsUpdate::default(),
            }),
            SCROLL => {
                let payload = payload.ok_or_else(|| BridgeError::MissingPayload(kind.clone()))?;
                let scroll: ScrollPayload = typed(&kind, payload)?;
                InboundCommand::ScrollTo(scroll.id)
            }
            ADD_SELECTION => InboundCommand::AddSelection(match payload {
                Some(payload) => typed(&kind, payload)?,
                None => SelectionDetails::default(),
            }),
            NOTE_SELECTION => InboundCommand::NoteSelection,
            SELECTION => {
                let payload = payload.ok_or_else(|| BridgeError::MissingPayload(kind.clone()))?;
                InboundCommand::Selection(typed(&kind, payload)?)
            }
            _ => return Ok(None),
        };

        Ok(Some(command))
    }

    /// Parse and decode one line
    pub fn from_line(line: &str) -> Result<Option<Self>, BridgeError> {
        Self::decode(Envelope::from_json(line)?)
    }
}

fn typed<T: DeserializeOwned>(kind: &str, payload: Value) -> Result<T, BridgeError> {
    serde_json::from_value(payload).map_err(|source| BridgeError::InvalidPayload {
        kind: kind.to_string(),
        source,
    })
}

/// Records must come as an array; individual malformed records are dropped
fn records(kind: &str, payload: Value) -> Result<Vec<HighlightRecord>, BridgeError> {
    let items: Vec<Value> = typed(kind, payload)?;
    let total = items.len();

    let records: Vec<HighlightRecord> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "dropping malformed highlight record");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(kept = records.len(), total, "some highlight records were dropped");
    }
    Ok(records)
}

/// Events sent back to the host
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    Ready { url: String },
    Added(AddDetails),
    Updated(UpdateDetails),
    Removed(RemoveDetails),
}

impl OutboundEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundEvent::Ready { .. } => READY,
            OutboundEvent::Added(_) => ADD,
            OutboundEvent::Updated(_) => UPDATE,
            OutboundEvent::Removed(_) => REMOVE,
        }
    }

    pub fn to_envelope(&self) -> Result<Envelope, BridgeError> {
        let payload = match self {
            OutboundEvent::Ready { url } => json!({ "url": url }),
            OutboundEvent::Added(details) => serde_json::to_value(details)?,
            OutboundEvent::Updated(details) => serde_json::to_value(details)?,
            OutboundEvent::Removed(details) => serde_json::to_value(details)?,
        };
        Ok(Envelope::new(self.kind(), Some(payload)))
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        self.to_envelope()?.to_json()
    }
}

impl From<HighlightEvent> for OutboundEvent {
    fn from(event: HighlightEvent) -> Self {
        match event {
            HighlightEvent::Added(details) => OutboundEvent::Added(details),
            HighlightEvent::Updated(details) => OutboundEvent::Updated(details),
            HighlightEvent::Removed(details) => OutboundEvent::Removed(details),
        }
    }
}
