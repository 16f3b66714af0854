//! Notefinder core - an aggregating, continuously synchronized note index.
//!
//! This library collects notes from heterogeneous sources (plain file trees,
//! Firefox bookmark databases, a cloud-service placeholder) into one
//! in-memory store, keeps that store in step with its sources by polling,
//! and serves substring search over it, including the text inside PDFs.
//!
//! # Architecture
//!
//! - **models**: Notes, notebooks, store keys and queries
//! - **sources**: One [`NoteSource`] implementation per backend
//! - **store**: The reader/writer-locked index with streaming search
//! - **matching**: Content matchers for binary payloads, keyed by MIME type
//! - **bus**: Capacity-one channel of changed notes
//! - **sync**: The polling worker that reconciles sources into the store
//! - **consumer**: Bus consumers (term frequencies)
//! - **metrics**: Synchronizer counters
//! - **config**: Environment settings and the notebook file
//! - **error**: Custom error types for precise error handling

pub mod bus;
pub mod config;
pub mod consumer;
pub mod error;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod sources;
pub mod store;
pub mod sync;
pub mod util;

// Re-export commonly used types
pub use bus::{BusReader, BusWriter};
pub use config::Config;
pub use consumer::TermIndexer;
pub use error::{ConfigError, ConfigResult, SourceError, SourceResult};
pub use matching::{ContentMatcher, ContentMatchers, PdfContentMatcher};
pub use metrics::{MetricsSummary, SyncMetrics};
pub use models::{
    Markup, Note, NoteFlags, NoteKey, NoteType, Notebook, NotebookId, NotebookKind, Query,
    QueryMethod,
};
pub use sources::{FileSource, GoogleSource, MozillaSource, NoteSource};
pub use store::Store;
pub use sync::{CycleReport, Discoverer, MozillaDiscoverer, RefreshHook, Request, Worker};
pub use util::short_text;
