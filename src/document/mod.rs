//! Document tree module
//!
//! The text-bearing tree that highlights are anchored onto:
//! - `tree`: arena of element and text nodes with the edits the
//!   materializer needs (split, surround, unwrap, normalize)
//! - `parser`: XHTML markup to tree (quick-xml)
//! - `writer`: tree back to markup (quick-xml)

mod error;
mod parser;
mod tree;
mod writer;

pub use error::DocumentError;
pub use parser::parse;
pub use tree::{Document, Element, NodeId, NodeKind};
pub use writer::write;
