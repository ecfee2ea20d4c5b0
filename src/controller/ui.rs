//! UI collaborators
//!
//! The controller drives a floating action menu and a modal prompt but owns
//! neither. Hosts plug in their own; the headless versions log what would
//! have been shown.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::highlight::Color;

/// A point in document coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A client rectangle relative to the visible area
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// The user's current text selection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub text: String,
    pub rect: Rect,
}

impl Selection {
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            rect,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Floating action menu (color picker, note, remove)
pub trait Menu {
    fn show(&mut self, at: Point, active: Option<&Color>, has_note: bool, can_remove: bool);

    fn hide(&mut self);
}

/// Modal text input and confirmations
pub trait Prompt {
    /// Ask for a line of text; `None` when dismissed
    fn prompt(&mut self, at: Option<Point>, placeholder: &str, value: &str) -> Option<String>;

    fn confirm(&mut self, message: &str) -> bool;

    fn alert(&mut self, message: &str);
}

/// Menu for hosts without a UI
#[derive(Debug, Default)]
pub struct HeadlessMenu {
    visible: bool,
}

impl HeadlessMenu {
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Menu for HeadlessMenu {
    fn show(&mut self, at: Point, active: Option<&Color>, has_note: bool, can_remove: bool) {
        debug!(
            x = at.x,
            y = at.y,
            color = active.map(Color::as_str),
            has_note,
            can_remove,
            "menu shown"
        );
        self.visible = true;
    }

    fn hide(&mut self) {
        if self.visible {
            debug!("menu hidden");
        }
        self.visible = false;
    }
}

/// Prompt for hosts without a UI: dismisses every prompt and accepts every
/// confirmation
#[derive(Debug, Default)]
pub struct HeadlessPrompt;

impl Prompt for HeadlessPrompt {
    fn prompt(&mut self, _at: Option<Point>, placeholder: &str, _value: &str) -> Option<String> {
        debug!(placeholder, "prompt dismissed");
        None
    }

    fn confirm(&mut self, message: &str) -> bool {
        debug!(message, "confirmation accepted");
        true
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!(message, "alert");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_defaults_size() {
        let rect: Rect = serde_json::from_str(r#"{"x": 4, "y": 8}"#).unwrap();
        assert_eq!(rect, Rect { x: 4.0, y: 8.0, width: 0.0, height: 0.0 });
    }

    #[test]
    fn test_blank_selection_is_empty() {
        assert!(Selection::new(" \n ", Rect::default()).is_empty());
        assert!(!Selection::new("word", Rect::default()).is_empty());
    }

    #[test]
    fn test_headless_menu_visibility() {
        let mut menu = HeadlessMenu::default();
        menu.show(Point::new(1.0, 2.0), None, false, true);
        assert!(menu.is_visible());
        menu.hide();
        assert!(!menu.is_visible());
    }
}
