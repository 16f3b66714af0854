//! Notebooks: named bindings between a configuration section and one source.

use crate::error::SourceResult;
use crate::models::note::{Note, NoteField};
use crate::sources::NoteSource;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a notebook within one run. Cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotebookId(Arc<str>);

impl NotebookId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotebookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NotebookId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl Serialize for NotebookId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// How a notebook came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotebookKind {
    /// Declared in the notebook file
    Configured,
    /// Found at runtime, e.g. a browser profile
    AutoDiscovered,
}

/// A named, configured handle on one [`NoteSource`].
///
/// All data operations delegate to the underlying source.
pub struct Notebook {
    id: NotebookId,
    kind: NotebookKind,
    config: HashMap<String, String>,
    source: Arc<dyn NoteSource>,
    enabled: bool,
}

impl Notebook {
    pub fn new(
        name: impl AsRef<str>,
        source: Arc<dyn NoteSource>,
        config: HashMap<String, String>,
        kind: NotebookKind,
    ) -> Self {
        Self {
            id: NotebookId::new(name),
            kind,
            config,
            source,
            enabled: true,
        }
    }

    /// Disable or re-enable polling of this notebook.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn id(&self) -> &NotebookId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn kind(&self) -> NotebookKind {
        self.kind
    }

    pub fn config(&self) -> &HashMap<String, String> {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Backend kind of the wrapped source (`file`, `mozilla`, ...).
    pub fn source_kind(&self) -> &'static str {
        self.source.kind()
    }

    pub async fn load_data(&self) -> SourceResult<HashMap<u64, Note>> {
        self.source.load_data().await
    }

    pub async fn can_write(&self) -> SourceResult<bool> {
        self.source.can_write().await
    }

    /// Capability probe folded to a plain answer; the reason is logged.
    pub async fn is_writable(&self) -> bool {
        match self.source.can_write().await {
            Ok(writable) => writable,
            Err(e) => {
                tracing::debug!(notebook = %self.id, "Notebook is not writable: {}", e);
                false
            }
        }
    }

    pub async fn put_data(&self, note: &Note) -> SourceResult<()> {
        self.source.put_data(note).await
    }

    pub async fn update_data(&self, old: &Note, new: &Note) -> SourceResult<()> {
        self.source.update_data(old, new).await
    }

    pub async fn delete_data(&self, note: &Note) -> SourceResult<()> {
        self.source.delete_data(note).await
    }

    pub fn supported_properties(&self) -> &'static [(NoteField, bool)] {
        self.source.supported_properties()
    }
}

impl fmt::Debug for Notebook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notebook")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("source", &self.source.kind())
            .field("enabled", &self.enabled)
            .finish()
    }
}
