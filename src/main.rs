//! Notefinder - main entry point
//!
//! Loads the configured notebooks, keeps them synchronized in the background,
//! and answers search needles read line by line from stdin. Matches are
//! printed to stdout as JSON lines; all logging goes to stderr.

use anyhow::Result;
use notefinder_core::config::{load_notebooks, Config};
use notefinder_core::sync::request_channel;
use notefinder_core::{
    bus, short_text, ConfigError, ContentMatchers, MozillaDiscoverer, Note, Query, Request,
    Store, TermIndexer, Worker,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Snippet length for printed matches.
const SNIPPET_LIMIT: usize = 60;

/// One printed search result.
#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    notebook: Option<&'a str>,
    uuid: u64,
    title: &'a str,
    uri: &'a str,
    snippet: String,
    matching_fields: &'a [String],
}

impl<'a> From<&'a Note> for SearchHit<'a> {
    fn from(note: &'a Note) -> Self {
        Self {
            notebook: note.source.as_ref().map(|id| id.as_str()),
            uuid: note.uuid,
            title: &note.title,
            uri: &note.uri,
            snippet: short_text(&note.body, SNIPPET_LIMIT),
            matching_fields: &note.matching_fields,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // LOG_LEVEL may come from .env, so load it before building the filter
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr only, stdout carries results)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let notebooks = match load_notebooks(&config.notebook_file) {
        Ok(notebooks) => notebooks,
        Err(ConfigError::Io { path, source }) if config.auto_discover => {
            warn!(
                "Cannot read notebook file {}: {}; relying on auto-discovery",
                path.display(),
                source
            );
            Vec::new()
        }
        Err(e) => {
            error!("Failed to load notebooks: {}", e);
            return Err(e.into());
        }
    };

    let store = Arc::new(
        Store::new(ContentMatchers::with_defaults())
            .with_content_match_timeout(config.content_match_timeout),
    );
    for notebook in notebooks {
        if !store.create_notebook(notebook) {
            warn!("Duplicate notebook section ignored");
        }
    }
    info!("{} notebooks configured", store.notebooks().len());

    let (bus_writer, bus_reader) = bus::channel();
    let (requests, request_rx) = request_channel();

    let refresh_store = store.clone();
    let mut worker = Worker::new(store.clone(), bus_writer, request_rx)
        .with_interval(config.sync_interval)
        .with_refresh(move || info!(notes = refresh_store.len(), "Store refreshed"));

    if config.auto_discover {
        match dirs::home_dir() {
            Some(home) => worker = worker.with_discoverer(MozillaDiscoverer::new(home)),
            None => warn!("No home directory, browser profiles will not be discovered"),
        }
    }

    let metrics = worker.metrics();
    let indexer = Arc::new(TermIndexer::new());

    let consumer_handle = {
        let indexer = indexer.clone();
        tokio::spawn(async move { indexer.run(bus_reader).await })
    };
    let worker_handle = tokio::spawn(worker.run());

    // Initial load without waiting for the first tick
    if requests.send(Request::Reload).await.is_err() {
        warn!("Synchronizer stopped before the initial load");
    }

    info!("Reading search needles from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let needle = line.trim();
        if needle.is_empty() {
            continue;
        }

        let results = store.search(&Query::new(needle)).await;
        info!("{} matches for {:?}", results.len(), needle);
        for note in &results {
            println!("{}", serde_json::to_string(&SearchHit::from(note))?);
        }
    }

    let _ = requests.send(Request::Stop).await;
    worker_handle.await?;
    let processed = consumer_handle.await?;

    info!(
        processed = processed,
        indexed = indexer.indexed_count(),
        "Notefinder shutdown complete: {:?}",
        metrics.summary()
    );
    Ok(())
}
