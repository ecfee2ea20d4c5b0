//! Layout module
//!
//! The anchoring core needs three answers from whatever renders the
//! document: whether an element currently has a layout box, where a node
//! sits vertically, and how to scroll. `Viewport` is that seam; `FlowLayout`
//! is a deterministic line-flow implementation for headless hosts and tests.

mod flow;

pub use flow::FlowLayout;

use crate::document::{Document, NodeId};

/// Rendering collaborator
pub trait Viewport {
    /// Whether the node currently has a layout box. Detached nodes and
    /// nodes inside hidden subtrees have none.
    fn is_rendered(&self, doc: &Document, node: NodeId) -> bool;

    /// Top edge of the node relative to the visible area
    fn bounding_top(&self, doc: &Document, node: NodeId) -> f64;

    /// Vertical scroll offset of the visible area
    fn scroll_offset(&self) -> f64;

    /// Horizontal scroll offset of the visible area
    fn scroll_left(&self) -> f64 {
        0.0
    }

    /// Total scrollable height of the document
    fn document_height(&self, doc: &Document) -> f64;

    /// Scroll so the node is centered in the visible area
    fn scroll_into_view(&mut self, doc: &Document, node: NodeId);
}
