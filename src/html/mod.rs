//! HTML processing module
//!
//! Markup-level passes that run before a document is parsed:
//! - Sanitization of active content
//! - Stripping of previously rendered highlight regions
//!
//! Uses lol_html for efficient streaming HTML processing.

mod rewrite;

pub use rewrite::{sanitize_html, strip_regions, MarkupError};

use crate::document::{self, Document};
use crate::error::Result;
use crate::highlight::RegionMarkup;

/// Load markup into a clean document tree: sanitize, strip old regions,
/// parse and merge adjacent text
pub fn load_document(html: &str, markup: &RegionMarkup) -> Result<Document> {
    let sanitized = sanitize_html(html)?;
    let stripped = strip_regions(&sanitized, markup)?;
    let mut doc = document::parse(&stripped)?;
    let root = doc.root();
    doc.normalize(root);
    Ok(doc)
}
