//! The shared note index.
//!
//! This module provides the reader/writer-locked store every other component
//! reads from, with point operations and streaming search.

pub mod note_store;

pub use note_store::{Store, DEFAULT_CONTENT_MATCH_TIMEOUT};
