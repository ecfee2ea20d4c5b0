//! Highlight Anchor host
//!
//! Loads one document, then speaks the highlight bridge protocol over stdio:
//! JSON commands on stdin, JSON events on stdout, logs on stderr.

use anyhow::Context;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use highlight_anchor::config::Config;
use highlight_anchor::controller::{HeadlessMenu, HeadlessPrompt, Highlighter};
use highlight_anchor::document;
use highlight_anchor::highlight::RegionMarkup;
use highlight_anchor::html::load_document;
use highlight_anchor::layout::FlowLayout;
use highlight_anchor::runtime::EventLoop;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the bridge
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "highlight_anchor=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.host.document_path.clone())
        .context("no document given: pass a path or set RDH_DOCUMENT")?;
    let url = config
        .host
        .url
        .clone()
        .unwrap_or_else(|| format!("file://{}", path.display()));

    tracing::info!("Starting Highlight Anchor v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Document: {}", path.display());

    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(read_lines(tx));

    let mut event_loop = EventLoop::new(rx, tokio::io::stdout());
    event_loop
        .start(load(path.clone(), config.clone()), url)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;

    tokio::select! {
        result = event_loop.run() => result?,
        _ = shutdown_signal() => {}
    }

    if let Some(output) = &config.host.output_path {
        let (mut bridge, _) = event_loop.into_parts();
        if let Some(highlighter) = bridge.detach() {
            let markup = document::write(&highlighter.into_document())?;
            tokio::fs::write(output, markup)
                .await
                .with_context(|| format!("failed to write {}", output.display()))?;
            tracing::info!("Decorated document written to {}", output.display());
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn load(path: PathBuf, config: Config) -> highlight_anchor::Result<Highlighter> {
    let markup = tokio::fs::read_to_string(&path).await?;
    let doc = load_document(&markup, &RegionMarkup::default())?;

    Ok(Highlighter::new(
        doc,
        &config.highlighter,
        Box::new(FlowLayout::new(config.layout.clone())),
        Box::new(HeadlessMenu::default()),
        Box::new(HeadlessPrompt),
    ))
}

/// Forward stdin lines to the event loop until either side goes away
async fn read_lines(tx: mpsc::Sender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
