//! Error types for the highlight anchoring crate
//!
//! Anchoring itself never fails: a highlight that no longer matches the
//! document resolves to "not anchored". The errors here cover loading and
//! writing documents, markup passes and the host bridge.

use thiserror::Error;

use crate::bridge::BridgeError;
use crate::document::DocumentError;
use crate::html::MarkupError;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Crate-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
