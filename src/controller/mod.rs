//! Lifecycle controller
//!
//! `Highlighter` owns one document and orchestrates the anchoring pipeline
//! over its container: reset, apply, test, scroll, and the interactive paths
//! that turn menu and selection events into `HighlightEvent`s. It never
//! applies an edit to the tree itself; callers persist the events and call
//! `apply` again.

mod ui;

pub use ui::{HeadlessMenu, HeadlessPrompt, Menu, Point, Prompt, Rect, Selection};

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::anchor::{extract, find_covering, Covering};
use crate::config::HighlighterConfig;
use crate::document::{Document, DocumentError, NodeId};
use crate::highlight::{
    materialize, plan, AddDetails, Color, HighlightEvent, HighlightId, HighlightRecord,
    RegionMarkup, RemoveDetails, SelectionDetails, UpdateDetails,
};
use crate::layout::Viewport;

/// Menu sits this far above the selection
const MENU_OFFSET: f64 = 32.0;

const REJECTED_SELECTION: &str = "Unfortunately we can't add this text";
const NOTES_UNAVAILABLE: &str = "Notes are only available in pro mode";
const CONFIRM_REMOVE: &str = "Remove highlight?";

/// Runtime switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Show the menu for fresh selections
    pub enabled: bool,
    /// Allow notes on new selections
    pub pro: bool,
    /// Render navigation markers
    pub nav: bool,
}

/// Partial settings change; absent fields are left alone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub pro: Option<bool>,
    #[serde(default)]
    pub nav: Option<bool>,
}

/// What the menu is currently acting on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    Selection,
    Region(HighlightId),
}

/// Outcome of `apply`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyResult {
    pub anchored: Vec<HighlightId>,
    pub unanchored: Vec<HighlightId>,
}

/// One document's highlighter
pub struct Highlighter {
    doc: Document,
    container: NodeId,
    markup: RegionMarkup,
    settings: Settings,
    max_selection_len: usize,
    selection_delay: Duration,
    viewport: Box<dyn Viewport>,
    menu: Box<dyn Menu>,
    prompt: Box<dyn Prompt>,
    selection: Option<Selection>,
    focused: bool,
    menu_target: Option<MenuTarget>,
    events: Vec<HighlightEvent>,
}

impl Highlighter {
    pub fn new(
        doc: Document,
        config: &HighlighterConfig,
        viewport: Box<dyn Viewport>,
        menu: Box<dyn Menu>,
        prompt: Box<dyn Prompt>,
    ) -> Self {
        let container = doc.container();
        Self {
            doc,
            container,
            markup: RegionMarkup::default(),
            settings: Settings {
                enabled: config.enabled,
                pro: config.pro,
                nav: config.nav,
            },
            max_selection_len: config.max_selection_len,
            selection_delay: Duration::from_millis(config.selection_delay_ms),
            viewport,
            menu,
            prompt,
            selection: None,
            focused: true,
            menu_target: None,
            events: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn viewport(&self) -> &dyn Viewport {
        self.viewport.as_ref()
    }

    pub fn markup(&self) -> &RegionMarkup {
        &self.markup
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn menu_target(&self) -> Option<&MenuTarget> {
        self.menu_target.as_ref()
    }

    pub fn configure(&mut self, update: SettingsUpdate) {
        if let Some(enabled) = update.enabled {
            self.settings.enabled = enabled;
        }
        if let Some(pro) = update.pro {
            self.settings.pro = pro;
        }
        if let Some(nav) = update.nav {
            self.settings.nav = nav;
        }
        debug!(settings = ?self.settings, "settings updated");
    }

    // ---- anchoring ----

    /// Remove every rendered region and navigation marker. Idempotent.
    pub fn reset(&mut self) {
        let markup = &self.markup;
        let regions = self.doc.find_elements(self.container, |e| markup.is_region(e));
        let markers = self
            .doc
            .find_elements(self.container, |e| markup.is_nav_marker(e));

        // Released only after the walk: ids of nested regions must not be
        // handed out again while they are still being checked
        let mut unwrapped = Vec::new();
        for region in regions {
            // Skip regions that went away with an enclosing one
            if !self.doc.is_attached(region) {
                continue;
            }
            let text = self.doc.text_content(region);
            match self.doc.replace_with_text(region, text) {
                Ok(_) => unwrapped.push(region),
                Err(e) => warn!(node = %region, error = %e, "failed to unwrap region"),
            }
        }
        for &region in &unwrapped {
            self.doc.remove(region);
        }
        for &marker in &markers {
            self.doc.remove(marker);
        }
        self.doc.normalize(self.container);

        if !unwrapped.is_empty() || !markers.is_empty() {
            debug!(
                regions = unwrapped.len(),
                markers = markers.len(),
                "highlights reset"
            );
        }
    }

    /// Reset, then anchor each record in order.
    ///
    /// Each record sees the regions of the ones before it as already taken.
    /// Records that no longer match are skipped.
    pub fn apply(&mut self, records: &[HighlightRecord]) -> ApplyResult {
        self.reset();

        let mut result = ApplyResult::default();
        for record in records {
            let anchored = match self.mark(record) {
                Ok(anchored) => anchored,
                Err(e) => {
                    warn!(id = %record.id, error = %e, "failed to wrap highlight");
                    false
                }
            };
            if anchored {
                result.anchored.push(record.id.clone());
            } else {
                result.unanchored.push(record.id.clone());
            }
        }

        info!(
            anchored = result.anchored.len(),
            unanchored = result.unanchored.len(),
            "highlights applied"
        );
        result
    }

    /// Anchor a single record against the current tree
    pub fn mark(&mut self, record: &HighlightRecord) -> Result<bool, DocumentError> {
        let covering = self.covering_for(&record.text);
        if covering.is_empty() {
            debug!(id = %record.id, "highlight not anchored");
            return Ok(false);
        }

        let plan = plan(&self.doc, &covering, record, self.settings.nav);
        let regions = materialize(
            &mut self.doc,
            self.viewport.as_ref(),
            &self.markup,
            self.container,
            &plan,
        )?;
        Ok(!regions.is_empty())
    }

    /// Covering of `text` over the container's available segments
    pub fn covering_for(&self, text: &str) -> Covering {
        let segments = extract(&self.doc, self.container, self.viewport.as_ref(), &self.markup);
        find_covering(&segments, text)
    }

    /// Would `text` anchor right now?
    pub fn test(&self, text: &str) -> bool {
        if text.chars().count() > self.max_selection_len {
            debug!(
                len = text.chars().count(),
                max = self.max_selection_len,
                "selection too long to test"
            );
            return false;
        }
        !self.covering_for(text).is_empty()
    }

    /// First region carrying `id`, in document order
    pub fn first_region(&self, id: &str) -> Option<NodeId> {
        let markup = &self.markup;
        self.doc
            .find_elements(self.container, |e| markup.is_region_for(e, id))
            .into_iter()
            .next()
    }

    /// Bring the first region with `id` into view. Returns false when absent.
    pub fn scroll_to_id(&mut self, id: &str) -> bool {
        if id.is_empty() {
            return false;
        }
        match self.first_region(id) {
            Some(region) => {
                self.viewport.scroll_into_view(&self.doc, region);
                debug!(id, scroll = self.viewport.scroll_offset(), "scrolled to highlight");
                true
            }
            None => false,
        }
    }

    // ---- selection ----

    /// Record a selection change and return how long to wait before
    /// rendering it
    pub fn select(&mut self, selection: Option<Selection>) -> Duration {
        self.selection = selection;
        if self.has_selection() {
            self.selection_delay
        } else {
            Duration::ZERO
        }
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn has_selection(&self) -> bool {
        self.selection.as_ref().map(|s| !s.is_empty()).unwrap_or(false)
    }

    /// Show the menu next to the selection, or hide it
    pub fn render_selection(&mut self) {
        let rect = match &self.selection {
            Some(selection)
                if self.settings.enabled && self.focused && !selection.is_empty() =>
            {
                selection.rect
            }
            _ => {
                // A region menu stays open when the selection goes away
                if !matches!(self.menu_target, Some(MenuTarget::Region(_))) {
                    self.hide_menu();
                }
                return;
            }
        };

        let at = Point::new(
            self.viewport.scroll_left() + rect.x + rect.width,
            self.viewport.scroll_offset() + rect.y - MENU_OFFSET,
        );
        self.menu_target = Some(MenuTarget::Selection);
        self.menu.show(at, None, false, false);
    }

    /// Report the current selection as a new highlight
    pub fn add_selection(&mut self, details: SelectionDetails) {
        let Some(selection) = &self.selection else {
            return;
        };
        let text = selection.text.trim().to_string();

        if !self.test(&text) {
            debug!(len = text.len(), "selection rejected");
            self.prompt.alert(REJECTED_SELECTION);
            return;
        }

        self.events.push(HighlightEvent::Added(AddDetails {
            text,
            color: details.color,
            note: details.note,
        }));
        self.selection = None;
        if matches!(self.menu_target, Some(MenuTarget::Selection)) {
            self.hide_menu();
        }
    }

    /// Ask for a note and report the selection with it
    pub fn note_selection(&mut self, at: Option<Point>) {
        if !self.settings.pro {
            self.prompt.alert(NOTES_UNAVAILABLE);
            return;
        }

        let note = self.prompt.prompt(at, "Add note...", "");
        if let Some(note) = note.filter(|n| !n.trim().is_empty()) {
            self.add_selection(SelectionDetails {
                color: None,
                note: Some(note),
            });
        }
    }

    // ---- regions and markers ----

    /// Open the menu for a clicked region. Regions inside links are left to
    /// the link.
    pub fn on_region_click(&mut self, node: NodeId, at: Point) -> bool {
        let Some(element) = self.doc.element(node) else {
            return false;
        };
        if !self.markup.is_region(element) {
            return false;
        }
        if self.doc.parent(node).and_then(|p| self.doc.tag_name(p)) == Some("a") {
            return false;
        }

        let Some(id) = element.attribute(&self.markup.id_attribute) else {
            return false;
        };
        let color = element
            .attribute("style")
            .and_then(|style| self.markup.color_from_style(style))
            .map(Color::from);
        let has_note = element.has_attribute(&self.markup.note_attribute);

        self.menu_target = Some(MenuTarget::Region(HighlightId::from(id)));
        self.menu.show(at, color.as_ref(), has_note, true);
        true
    }

    pub fn on_nav_click(&mut self, node: NodeId) -> bool {
        let id = match self.doc.element(node) {
            Some(element) if self.markup.is_nav_marker(element) => element
                .attribute(&self.markup.id_attribute)
                .unwrap_or_default()
                .to_string(),
            _ => return false,
        };
        self.scroll_to_id(&id)
    }

    // ---- menu callbacks ----

    pub fn on_color_click(&mut self, color: Color) {
        match self.menu_target.clone() {
            Some(MenuTarget::Selection) => self.add_selection(SelectionDetails {
                color: Some(color),
                note: None,
            }),
            Some(MenuTarget::Region(id)) => {
                if self.first_region(id.as_str()).is_some() {
                    self.events.push(HighlightEvent::Updated(UpdateDetails {
                        id,
                        color: Some(color),
                        note: None,
                    }));
                } else {
                    debug!(%id, "color change for a missing highlight");
                }
                self.hide_menu();
            }
            None => {}
        }
    }

    pub fn on_note_click(&mut self, at: Option<Point>) {
        match self.menu_target.clone() {
            Some(MenuTarget::Selection) => self.note_selection(at),
            Some(MenuTarget::Region(id)) => {
                let Some(region) = self.first_region(id.as_str()) else {
                    debug!(%id, "note change for a missing highlight");
                    self.hide_menu();
                    return;
                };
                let current = self
                    .doc
                    .attribute(region, &self.markup.note_attribute)
                    .unwrap_or_default()
                    .to_string();

                let updated = self.prompt.prompt(at, "Note...", &current);
                self.hide_menu();
                if let Some(note) = updated {
                    self.events.push(HighlightEvent::Updated(UpdateDetails {
                        id,
                        color: None,
                        note: Some(note),
                    }));
                }
            }
            None => {}
        }
    }

    pub fn on_remove_click(&mut self) {
        let Some(MenuTarget::Region(id)) = self.menu_target.clone() else {
            return;
        };
        let Some(region) = self.first_region(id.as_str()) else {
            debug!(%id, "removal of a missing highlight");
            self.hide_menu();
            return;
        };

        if self.doc.has_attribute(region, &self.markup.note_attribute)
            && !self.prompt.confirm(CONFIRM_REMOVE)
        {
            return;
        }

        self.events
            .push(HighlightEvent::Removed(RemoveDetails { id }));
        self.hide_menu();
    }

    pub fn hide_menu(&mut self) {
        self.menu.hide();
        self.menu_target = None;
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<HighlightEvent> {
        std::mem::take(&mut self.events)
    }
}
