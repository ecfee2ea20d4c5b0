//! Highlight record and event types
//!
//! Records are owned by the caller: the anchoring core only reads `text`,
//! `color` and `note`, and reports `id` back when the user interacts with a
//! rendered region. Events carry no tree positions.

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Opaque highlight identifier.
///
/// Hosts send ids as JSON strings or numbers; both are kept as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HighlightId(String);

impl HighlightId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HighlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HighlightId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for HighlightId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(id) => Ok(Self(id)),
            Value::Number(id) => Ok(Self(id.to_string())),
            other => Err(de::Error::custom(format!(
                "highlight id must be a string or a number, got {}",
                other
            ))),
        }
    }
}

/// Highlight color
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Color {
    /// Default color; rendered without an override
    #[default]
    Yellow,
    Blue,
    Green,
    Red,
    /// Any other CSS color value
    Other(String),
}

impl Color {
    /// Colors offered by the menu
    pub const PALETTE: [Color; 4] = [Color::Yellow, Color::Blue, Color::Green, Color::Red];

    pub fn as_str(&self) -> &str {
        match self {
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Red => "red",
            Color::Other(value) => value,
        }
    }

    /// Whether regions in this color need no color override
    pub fn is_default(&self) -> bool {
        matches!(self, Color::Yellow)
    }
}

impl From<String> for Color {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "green" => Color::Green,
            "red" => Color::Red,
            other => Color::Other(other.to_string()),
        }
    }
}

impl From<&str> for Color {
    fn from(value: &str) -> Self {
        Color::from(value.to_string())
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.as_str().to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A previously recorded highlight to anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRecord {
    #[serde(alias = "_id")]
    pub id: HighlightId,
    /// The exact source phrase
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl HighlightRecord {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: HighlightId::new(id),
            text: text.into(),
            color: None,
            note: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Color that needs an explicit override when rendered
    pub fn color_override(&self) -> Option<&Color> {
        self.color.as_ref().filter(|c| !c.is_default())
    }

    /// Note text, treating an empty note as absent
    pub fn note_text(&self) -> Option<&str> {
        self.note.as_deref().filter(|n| !n.is_empty())
    }
}

/// Details attached by the user to a new selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A new highlight captured from the selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddDetails {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A color or note change on an existing highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub id: HighlightId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Removal of an existing highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveDetails {
    pub id: HighlightId,
}

/// Events reported to the caller, who persists them and re-applies
#[derive(Debug, Clone, PartialEq)]
pub enum HighlightEvent {
    Added(AddDetails),
    Updated(UpdateDetails),
    Removed(RemoveDetails),
}
