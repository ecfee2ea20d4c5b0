//! Segment extraction
//!
//! Walks a subtree in document order and yields the visible text leaves that
//! are not already inside a rendered highlight region.

use crate::document::{Document, NodeId, NodeKind};
use crate::highlight::RegionMarkup;
use crate::layout::Viewport;

/// A visible, unwrapped text leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// The text node
    pub node: NodeId,
    /// Position in document order among the extracted segments
    pub position: usize,
    /// Raw text content
    pub text: &'a str,
}

/// Extract the ordered segments below `root`.
///
/// Elements are skipped with their whole subtree when the viewport reports
/// no layout box for them or when they carry the region id attribute.
/// Whitespace-only text is skipped.
pub fn extract<'a>(
    doc: &'a Document,
    root: NodeId,
    viewport: &dyn Viewport,
    markup: &RegionMarkup,
) -> Vec<Segment<'a>> {
    let mut segments = Vec::new();
    collect(doc, root, viewport, markup, &mut segments);
    segments
}

fn collect<'a>(
    doc: &'a Document,
    node: NodeId,
    viewport: &dyn Viewport,
    markup: &RegionMarkup,
    segments: &mut Vec<Segment<'a>>,
) {
    for &child in doc.children(node) {
        match doc.kind(child) {
            NodeKind::Element(element) => {
                if element.has_attribute(&markup.id_attribute) {
                    continue;
                }
                if !viewport.is_rendered(doc, child) {
                    continue;
                }
                collect(doc, child, viewport, markup, segments);
            }
            NodeKind::Text(text) => {
                if !text.trim().is_empty() {
                    segments.push(Segment {
                        node: child,
                        position: segments.len(),
                        text,
                    });
                }
            }
        }
    }
}
