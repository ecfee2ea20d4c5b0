//! Highlight records, events and rendering
//!
//! - `types`: the records callers hand in and the events they get back
//! - `markup`: names of the elements and attributes rendered into documents
//! - `materializer`: turns a covering into wrapped regions

mod markup;
mod materializer;
mod types;

pub use markup::RegionMarkup;
pub use materializer::{materialize, plan, MarkPlan, RegionPlan};
pub use types::{
    AddDetails, Color, HighlightEvent, HighlightId, HighlightRecord, RemoveDetails,
    SelectionDetails, UpdateDetails,
};
