//! Highlight Anchor
//!
//! Re-anchors recorded text highlights onto a live document tree and renders
//! them as wrapped regions, without stored offsets or stable node ids.
//!
//! # Modules
//!
//! - `document`: arena tree, XHTML parser and writer
//! - `html`: streaming markup passes run before parsing
//! - `layout`: the rendering collaborator (`Viewport`)
//! - `anchor`: segment extraction and candidate matching
//! - `highlight`: records, events and the materializer
//! - `controller`: the per-document `Highlighter`
//! - `bridge`: host wire messages and the pre-ready queue
//! - `runtime`: the single-threaded event loop

pub mod anchor;
pub mod bridge;
pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod highlight;
pub mod html;
pub mod layout;
pub mod runtime;

pub use controller::Highlighter;
pub use error::{AppError, Result};
