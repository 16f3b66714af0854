//! Downstream consumers of the event bus.

pub mod term_indexer;

pub use term_indexer::{term_frequencies, TermIndexer};
