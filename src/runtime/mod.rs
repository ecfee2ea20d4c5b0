//! Single-threaded event loop
//!
//! Inbound wire lines and the selection debounce deadline are the only two
//! event sources. Everything runs on one task; the highlighter is never
//! shared.

mod debounce;

pub use debounce::Debouncer;

use std::future::Future;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::bridge::Bridge;
use crate::controller::{Highlighter, MenuTarget};
use crate::error::Result;

/// Drives a `Bridge` from a channel of wire lines and writes outbound
/// events to `sink`, one JSON object per line
pub struct EventLoop<W> {
    bridge: Bridge,
    debouncer: Debouncer,
    inbound: mpsc::Receiver<String>,
    sink: W,
    closed: bool,
}

impl<W: AsyncWrite + Unpin> EventLoop<W> {
    pub fn new(inbound: mpsc::Receiver<String>, sink: W) -> Self {
        Self {
            bridge: Bridge::new(),
            debouncer: Debouncer::new(),
            inbound,
            sink,
            closed: false,
        }
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    pub fn into_parts(self) -> (Bridge, W) {
        (self.bridge, self.sink)
    }

    /// Wait for the highlighter while queueing whatever the host sends, then
    /// attach it and announce readiness
    pub async fn start<F>(&mut self, loader: F, url: impl Into<String>) -> Result<()>
    where
        F: Future<Output = Result<Highlighter>>,
    {
        tokio::pin!(loader);

        let highlighter = loop {
            tokio::select! {
                biased;

                line = self.inbound.recv(), if !self.closed => match line {
                    Some(line) => self.handle_line(&line),
                    None => self.closed = true,
                },
                result = &mut loader => break result?,
            }
        };

        let delay = self.bridge.attach(highlighter, url);
        self.schedule(delay);
        self.flush().await
    }

    /// Process events until the inbound channel closes. A selection render
    /// still waiting on its quiet period runs before returning.
    pub async fn run(&mut self) -> Result<()> {
        while !self.closed {
            tokio::select! {
                line = self.inbound.recv() => match line {
                    Some(line) => self.handle_line(&line),
                    None => self.closed = true,
                },
                _ = self.debouncer.fired() => self.bridge.render_selection(),
            }
            self.flush().await?;
        }

        debug!("inbound channel closed");
        if self.debouncer.is_pending() {
            self.debouncer.fired().await;
            self.bridge.render_selection();
            self.flush().await?;
        }
        Ok(())
    }

    fn handle_line(&mut self, line: &str) {
        let delay = self.bridge.receive_line(line);
        self.schedule(delay);
    }

    fn schedule(&mut self, delay: Option<Duration>) {
        // Nothing to show and no selection menu left to hide
        let idle = self.bridge.highlighter().map_or(true, |h| {
            !h.has_selection() && h.menu_target() != Some(&MenuTarget::Selection)
        });
        match delay {
            Some(delay) => self.debouncer.schedule(delay),
            None if idle => self.debouncer.cancel(),
            None => {}
        }
    }

    async fn flush(&mut self) -> Result<()> {
        let events = self.bridge.drain_outbound();
        if events.is_empty() {
            return Ok(());
        }

        for event in events {
            let mut line = event.to_json()?;
            line.push('\n');
            self.sink.write_all(line.as_bytes()).await?;
        }
        self.sink.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HighlighterConfig, LayoutConfig};
    use crate::controller::{HeadlessMenu, HeadlessPrompt};
    use crate::document::parse;
    use crate::layout::FlowLayout;
    use serde_json::Value;

    fn highlighter() -> Result<Highlighter> {
        Ok(Highlighter::new(
            parse("<body><p>Hello <b>world</b>, how are you?</p></body>")?,
            &HighlighterConfig::default(),
            Box::new(FlowLayout::new(LayoutConfig::default())),
            Box::new(HeadlessMenu::default()),
            Box::new(HeadlessPrompt),
        ))
    }

    fn written_types(sink: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(sink)
            .lines()
            .map(|line| {
                let value: Value = serde_json::from_str(line).unwrap();
                value["type"].as_str().unwrap().to_string()
            })
            .collect()
    }

    #[tokio::test]
    async fn test_lines_before_ready_are_replayed() {
        let (tx, rx) = mpsc::channel(8);
        tx.send(r#"{"type":"RDH_APPLY","payload":[{"id":1,"text":"world"}]}"#.to_string())
            .await
            .unwrap();
        tx.send(r#"{"type":"RDH_SELECTION","payload":{"text":"how are"}}"#.to_string())
            .await
            .unwrap();
        tx.send(r#"{"type":"RDH_ADD_SELECTION"}"#.to_string())
            .await
            .unwrap();

        let mut event_loop = EventLoop::new(rx, Vec::new());
        event_loop
            .start(async { highlighter() }, "file:///doc.xhtml")
            .await
            .unwrap();
        drop(tx);
        event_loop.run().await.unwrap();

        let (bridge, sink) = event_loop.into_parts();
        assert_eq!(written_types(&sink), vec!["RDH_ADD", "RDH_READY"]);

        let h = bridge.highlighter().unwrap();
        assert!(h.first_region("1").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_renders_after_quiet_period() {
        let (tx, rx) = mpsc::channel(8);
        let mut event_loop = EventLoop::new(rx, Vec::new());
        event_loop.start(async { highlighter() }, "").await.unwrap();

        tokio::spawn(async move {
            tx.send(r#"{"type":"RDH_SELECTION","payload":{"text":"world"}}"#.to_string())
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        });
        event_loop.run().await.unwrap();

        let h = event_loop.bridge().highlighter().unwrap();
        assert_eq!(h.menu_target(), Some(&MenuTarget::Selection));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_selection_renders_after_close() {
        let (tx, rx) = mpsc::channel(8);
        let mut event_loop = EventLoop::new(rx, Vec::new());
        event_loop.start(async { highlighter() }, "").await.unwrap();

        tx.send(r#"{"type":"RDH_SELECTION","payload":{"text":"world"}}"#.to_string())
            .await
            .unwrap();
        drop(tx);
        event_loop.run().await.unwrap();

        let h = event_loop.bridge().highlighter().unwrap();
        assert_eq!(h.menu_target(), Some(&MenuTarget::Selection));
    }

    #[tokio::test]
    async fn test_added_selection_cancels_render() {
        let (_tx, rx) = mpsc::channel::<String>(1);
        let mut event_loop = EventLoop::new(rx, Vec::new());
        event_loop.start(async { highlighter() }, "").await.unwrap();

        event_loop.handle_line(r#"{"type":"RDH_SELECTION","payload":{"text":"world"}}"#);
        assert!(event_loop.debouncer.is_pending());

        event_loop.handle_line(r#"{"type":"RDH_ADD_SELECTION"}"#);
        assert!(!event_loop.debouncer.is_pending());
        assert_eq!(event_loop.bridge.drain_outbound().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_is_reported() {
        let (_tx, rx) = mpsc::channel::<String>(1);
        let mut event_loop = EventLoop::new(rx, Vec::new());
        let result = event_loop
            .start(async { Err(crate::error::AppError::Config("missing".into())) }, "")
            .await;
        assert!(result.is_err());
        assert!(!event_loop.bridge().is_ready());
    }
}
