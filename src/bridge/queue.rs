//! Pre-ready queue and dispatch

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::message::{InboundCommand, OutboundEvent};
use crate::controller::{Highlighter, Selection};

/// Connects a host to at most one highlighter.
///
/// Commands that arrive before `attach` wait in order and are replayed once
/// the highlighter exists. Dispatching a selection change yields the delay
/// after which the selection should be rendered.
#[derive(Default)]
pub struct Bridge {
    highlighter: Option<Highlighter>,
    waiting: VecDeque<InboundCommand>,
    outbound: Vec<OutboundEvent>,
}

impl Bridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.highlighter.is_some()
    }

    pub fn highlighter(&self) -> Option<&Highlighter> {
        self.highlighter.as_ref()
    }

    pub fn highlighter_mut(&mut self) -> Option<&mut Highlighter> {
        self.highlighter.as_mut()
    }

    /// Number of commands waiting for a highlighter
    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    /// Decode and handle one wire line. Malformed lines are dropped.
    pub fn receive_line(&mut self, line: &str) -> Option<Duration> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        match InboundCommand::from_line(line) {
            Ok(Some(command)) => self.receive(command),
            Ok(None) => {
                debug!(line, "ignoring unknown message");
                None
            }
            Err(e) => {
                warn!(error = %e, "dropping malformed message");
                None
            }
        }
    }

    /// Handle a command now, or keep it until a highlighter is attached
    pub fn receive(&mut self, command: InboundCommand) -> Option<Duration> {
        if self.highlighter.is_none() {
            debug!(?command, "highlighter not ready, queueing command");
            self.waiting.push_back(command);
            return None;
        }
        self.dispatch(command)
    }

    /// Attach a highlighter, replay waiting commands in order, then report
    /// readiness
    pub fn attach(&mut self, highlighter: Highlighter, url: impl Into<String>) -> Option<Duration> {
        self.highlighter = Some(highlighter);

        let replayed = self.waiting.len();
        let mut delay = None;
        while let Some(command) = self.waiting.pop_front() {
            if let Some(next) = self.dispatch(command) {
                delay = Some(next);
            }
        }

        let url = url.into();
        info!(url = %url, replayed, "highlighter ready");
        self.outbound.push(OutboundEvent::Ready { url });
        delay
    }

    /// Release the highlighter; later commands queue again
    pub fn detach(&mut self) -> Option<Highlighter> {
        self.highlighter.take()
    }

    /// Render the current selection, after its debounce delay
    pub fn render_selection(&mut self) {
        if let Some(highlighter) = self.highlighter.as_mut() {
            highlighter.render_selection();
            self.outbound
                .extend(highlighter.drain_events().into_iter().map(OutboundEvent::from));
        }
    }

    /// Take the events waiting to be sent
    pub fn drain_outbound(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.outbound)
    }

    fn dispatch(&mut self, command: InboundCommand) -> Option<Duration> {
        let highlighter = self.highlighter.as_mut()?;

        let delay = match command {
            InboundCommand::Apply(records) => {
                highlighter.apply(&records);
                None
            }
            InboundCommand::Configure(update) => {
                highlighter.configure(update);
                None
            }
            InboundCommand::ScrollTo(id) => {
                if !highlighter.scroll_to_id(id.as_str()) {
                    debug!(%id, "nothing to scroll to");
                }
                None
            }
            InboundCommand::AddSelection(details) => {
                highlighter.add_selection(details);
                None
            }
            InboundCommand::NoteSelection => {
                highlighter.note_selection(None);
                None
            }
            InboundCommand::Selection(payload) => {
                if let Some(focused) = payload.focused {
                    highlighter.set_focus(focused);
                }
                let selection = Selection::new(payload.text, payload.rect.unwrap_or_default());
                Some(highlighter.select(Some(selection)))
            }
        };

        self.outbound
            .extend(highlighter.drain_events().into_iter().map(OutboundEvent::from));
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HighlighterConfig, LayoutConfig};
    use crate::controller::{HeadlessMenu, HeadlessPrompt};
    use crate::document::parse;
    use crate::highlight::{AddDetails, Color, HighlightId};
    use crate::layout::FlowLayout;

    fn highlighter() -> Highlighter {
        Highlighter::new(
            parse("<body><p>Hello <b>world</b>, how are you?</p></body>").unwrap(),
            &HighlighterConfig::default(),
            Box::new(FlowLayout::new(LayoutConfig::default())),
            Box::new(HeadlessMenu::default()),
            Box::new(HeadlessPrompt),
        )
    }

    fn region_ids(bridge: &Bridge) -> Vec<String> {
        let h = bridge.highlighter().unwrap();
        let doc = h.document();
        doc.find_elements(doc.root(), |e| h.markup().is_region(e))
            .into_iter()
            .filter_map(|r| doc.attribute(r, "data-rdhid").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_commands_before_attach_are_replayed_in_order() {
        let mut bridge = Bridge::new();
        bridge.receive_line(r#"{"type":"RDH_APPLY","payload":[{"id":"a","text":"Hello"}]}"#);
        bridge.receive_line(r#"{"type":"RDH_APPLY","payload":[{"id":"b","text":"world, how"}]}"#);
        assert_eq!(bridge.waiting(), 2);
        assert!(bridge.drain_outbound().is_empty());

        bridge.attach(highlighter(), "file:///doc.xhtml");

        assert_eq!(bridge.waiting(), 0);
        // The later apply wins: each apply starts from a reset
        assert_eq!(region_ids(&bridge), vec!["b", "b"]);
        assert_eq!(
            bridge.drain_outbound(),
            vec![OutboundEvent::Ready {
                url: "file:///doc.xhtml".to_string()
            }]
        );
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let mut bridge = Bridge::new();
        bridge.attach(highlighter(), "");
        bridge.drain_outbound();

        bridge.receive_line("{oops");
        bridge.receive_line(r#"{"type":"RDH_CONFIG","payload":{"pro":"very"}}"#);
        bridge.receive_line(r#"{"type":"RDH_SCROLL","payload":"a"}"#);
        bridge.receive_line("");

        assert!(bridge.drain_outbound().is_empty());
        assert!(!bridge.highlighter().unwrap().settings().pro);
    }

    #[test]
    fn test_selection_flow() {
        let mut bridge = Bridge::new();
        bridge.attach(highlighter(), "");
        bridge.drain_outbound();

        let delay = bridge.receive_line(
            r#"{"type":"RDH_SELECTION","payload":{"text":" world ","rect":{"x":0,"y":40}}}"#,
        );
        assert_eq!(delay, Some(Duration::from_millis(200)));

        bridge.render_selection();
        bridge.receive_line(r#"{"type":"RDH_ADD_SELECTION","payload":{"color":"blue"}}"#);

        assert_eq!(
            bridge.drain_outbound(),
            vec![OutboundEvent::Added(AddDetails {
                text: "world".to_string(),
                color: Some(Color::Blue),
                note: None,
            })]
        );
    }

    #[test]
    fn test_cleared_selection_renders_immediately() {
        let mut bridge = Bridge::new();
        bridge.attach(highlighter(), "");
        let delay = bridge.receive_line(r#"{"type":"RDH_SELECTION","payload":{"text":""}}"#);
        assert_eq!(delay, Some(Duration::ZERO));
    }

    #[test]
    fn test_detach_queues_again() {
        let mut bridge = Bridge::new();
        bridge.attach(highlighter(), "");
        assert!(bridge.detach().is_some());

        bridge.receive(InboundCommand::ScrollTo(HighlightId::from("a")));
        assert_eq!(bridge.waiting(), 1);
        assert!(!bridge.is_ready());
    }
}
