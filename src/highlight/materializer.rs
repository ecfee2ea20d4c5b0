//! Highlight materializer
//!
//! Turning a covering into wrapped regions happens in two steps. `plan` is
//! pure: it works out the exact byte range to wrap in every covered text
//! node and which decorations go where. `materialize` applies a plan to the
//! live tree and is the only step that mutates it.

use std::ops::Range;

use tracing::{debug, warn};

use super::markup::RegionMarkup;
use super::types::{Color, HighlightId, HighlightRecord};
use crate::anchor::whitespace::locate;
use crate::anchor::Covering;
use crate::document::{Document, DocumentError, Element, NodeId};
use crate::layout::Viewport;

/// Markers sit slightly above the first region
const NAV_LIFT: f64 = 10.0;

const NOTE_ICON_PATH: &str = "M8 0a2 2 0 0 1 2 2v8L6 8H2a2 2 0 0 1-2-2V2C0 .9.9 0 2 0h6ZM2 3a1 1 0 1 0 0 2 1 1 0 0 0 0-2Zm3 0a1 1 0 1 0 0 2 1 1 0 0 0 0-2Zm3 0a1 1 0 1 0 0 2 1 1 0 0 0 0-2Z";

/// One region to wrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionPlan {
    /// Text node to wrap
    pub node: NodeId,
    /// Byte range of the node's text covered by the region
    pub range: Range<usize>,
    /// Append the note glyph inside this region
    pub note_icon: bool,
    /// Place the navigation marker at this region
    pub nav_marker: bool,
}

/// Everything needed to render one highlight
#[derive(Debug, Clone, PartialEq)]
pub struct MarkPlan {
    pub id: HighlightId,
    /// Color override, absent for the default color
    pub color: Option<Color>,
    pub note: Option<String>,
    pub regions: Vec<RegionPlan>,
}

impl MarkPlan {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Work out the regions for a covering.
///
/// The first and last entries are bounded tightly to their sub-phrase; any
/// entry in between is wrapped whole. An empty covering yields an empty plan.
pub fn plan(doc: &Document, covering: &Covering, record: &HighlightRecord, nav: bool) -> MarkPlan {
    let note = record.note_text().map(str::to_string);
    let last = covering.len().saturating_sub(1);

    let regions = covering
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let text = doc.text(entry.node)?;
            let range = if i == 0 || i == last {
                locate(text, &entry.subphrase).unwrap_or_else(|| {
                    warn!(
                        id = %record.id,
                        node = %entry.node,
                        subphrase = %entry.subphrase,
                        "sub-phrase not found in its segment, wrapping the whole text"
                    );
                    0..text.len()
                })
            } else {
                0..text.len()
            };

            Some(RegionPlan {
                node: entry.node,
                range,
                note_icon: i == last && note.is_some(),
                nav_marker: i == 0 && nav,
            })
        })
        .collect();

    MarkPlan {
        id: record.id.clone(),
        color: record.color_override().cloned(),
        note,
        regions,
    }
}

/// Apply a plan to the tree, returning the created region elements in order.
///
/// Navigation markers are appended to `container`.
pub fn materialize(
    doc: &mut Document,
    viewport: &dyn Viewport,
    markup: &RegionMarkup,
    container: NodeId,
    plan: &MarkPlan,
) -> Result<Vec<NodeId>, DocumentError> {
    let mut created = Vec::with_capacity(plan.regions.len());

    for region in &plan.regions {
        let wrapper = doc.surround(region.node, region.range.clone(), region_element(markup, plan))?;

        if region.note_icon {
            let icon = doc.create_element(
                Element::new("svg")
                    .with_attribute("class", markup.note_icon_class.as_str())
                    .with_attribute("xmlns", "http://www.w3.org/2000/svg")
                    .with_attribute("viewBox", "0 0 10 10"),
            );
            let path = doc.create_element(Element::new("path").with_attribute("d", NOTE_ICON_PATH));
            doc.append_child(icon, path);
            doc.append_child(wrapper, icon);
        }

        if region.nav_marker {
            let marker = nav_element(doc, viewport, markup, plan, wrapper);
            let marker = doc.create_element(marker);
            doc.append_child(container, marker);
        }

        created.push(wrapper);
    }

    debug!(id = %plan.id, regions = created.len(), "highlight materialized");
    Ok(created)
}

fn region_element(markup: &RegionMarkup, plan: &MarkPlan) -> Element {
    let mut mark = Element::new(markup.region_tag.as_str())
        .with_attribute(&markup.id_attribute, plan.id.as_str());
    if let Some(color) = &plan.color {
        mark.set_attribute("style", markup.color_style(color.as_str()));
    }
    if let Some(note) = &plan.note {
        mark.set_attribute(&markup.note_attribute, note.as_str());
    }
    mark
}

fn nav_element(
    doc: &Document,
    viewport: &dyn Viewport,
    markup: &RegionMarkup,
    plan: &MarkPlan,
    wrapper: NodeId,
) -> Element {
    let height = viewport.document_height(doc);
    let offset = viewport.scroll_offset() + viewport.bounding_top(doc, wrapper) - NAV_LIFT;
    let top = if height > 0.0 { 100.0 / height * offset } else { 0.0 };

    let color = plan
        .color
        .as_ref()
        .map(|c| format!("{}; ", markup.color_style(c.as_str())))
        .unwrap_or_default();

    Element::new("a")
        .with_attribute("class", markup.nav_class.as_str())
        .with_attribute(&markup.id_attribute, plan.id.as_str())
        .with_attribute("style", format!("{}top: {:.2}%;", color, top))
}
