//! Store keys and query descriptors.

use crate::models::notebook::NotebookId;

/// Primary key of the store: a source-local id scoped by its notebook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteKey {
    pub notebook: NotebookId,
    pub uuid: u64,
}

impl NoteKey {
    pub fn new(notebook: NotebookId, uuid: u64) -> Self {
        Self { notebook, uuid }
    }
}

/// Matching strategy requested by a query.
///
/// Only literal substring matching is implemented; the other variants are
/// accepted and served the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMethod {
    #[default]
    Direct,
    WithIndex,
    Regexp,
    Complex,
}

/// A search request against the store.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Search text; empty matches everything
    pub needle: String,

    /// Restrict to one notebook; `None` searches all
    pub haystack: Option<NotebookId>,

    pub match_case: bool,

    pub method: QueryMethod,
}

impl Query {
    /// Query matching every note.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
            ..Default::default()
        }
    }

    pub fn in_notebook(mut self, notebook: NotebookId) -> Self {
        self.haystack = Some(notebook);
        self
    }

    pub fn with_match_case(mut self, match_case: bool) -> Self {
        self.match_case = match_case;
        self
    }

    pub fn with_method(mut self, method: QueryMethod) -> Self {
        self.method = method;
        self
    }

    /// Whether a note stored under `key` is inside this query's haystack.
    pub fn covers(&self, key: &NoteKey) -> bool {
        self.haystack
            .as_ref()
            .map_or(true, |notebook| *notebook == key.notebook)
    }
}
