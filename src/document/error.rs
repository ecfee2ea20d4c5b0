//! Document error types

use thiserror::Error;

use super::tree::NodeId;

/// Errors raised while loading, editing or writing a document tree
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The markup has no root element
    #[error("Document has no root element")]
    Empty,

    /// An end tag does not close the innermost open element
    #[error("Mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// The markup ended while an element was still open
    #[error("Unclosed element: <{0}>")]
    Unclosed(String),

    /// Content found outside the root element
    #[error("Malformed markup: {0}")]
    Malformed(String),

    /// The node is not a text node
    #[error("Node {0} is not a text node")]
    NotText(NodeId),

    /// The node is not attached to a parent
    #[error("Node {0} has no parent")]
    Detached(NodeId),

    /// A byte range does not fit the text it addresses
    #[error("Range {start}..{end} is invalid for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    /// XML reader or writer error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Written markup was not valid UTF-8
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
