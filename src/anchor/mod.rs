//! Anchoring module
//!
//! Relocates a recorded phrase in a live document without stored offsets:
//! - `extractor`: visible, not-yet-wrapped text segments in document order
//! - `matcher`: streaming alignment of a phrase against those segments
//! - `whitespace`: collapsed comparisons shared by both and the materializer

mod extractor;
mod matcher;
pub mod whitespace;

pub use extractor::{extract, Segment};
pub use matcher::{find_covering, CoverEntry, Covering};
