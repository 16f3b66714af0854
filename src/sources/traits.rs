use crate::error::SourceResult;
use crate::models::{Note, NoteField};
use async_trait::async_trait;
use std::collections::HashMap;

/// A backend that notes are loaded from and, where supported, written to.
///
/// Implementations normalize whatever the backend stores into [`Note`]s.
/// Read-only backends answer every mutating call (and `can_write`) with
/// `SourceError::Unsupported` carrying a human-readable reason.
#[async_trait]
pub trait NoteSource: Send + Sync {
    /// Short backend name used in configuration and logs.
    fn kind(&self) -> &'static str;

    /// Full snapshot of the backend, keyed by source-local id.
    ///
    /// Must be safe to call repeatedly and concurrently with other sources.
    /// On error nothing has been handed to the caller.
    async fn load_data(&self) -> SourceResult<HashMap<u64, Note>>;

    /// Probe whether new items may be created.
    async fn can_write(&self) -> SourceResult<bool>;

    /// Create a new item. Fails if the derived external identity exists.
    async fn put_data(&self, note: &Note) -> SourceResult<()>;

    /// Replace `old` with `new` in the backend.
    async fn update_data(&self, old: &Note, new: &Note) -> SourceResult<()>;

    /// Remove one item.
    async fn delete_data(&self, note: &Note) -> SourceResult<()>;

    /// Fields this backend exposes, paired with whether they are writable.
    fn supported_properties(&self) -> &'static [(NoteField, bool)];
}
