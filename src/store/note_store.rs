//! Concurrent in-memory note index.
//!
//! A single reader/writer lock guards the note map. Readers (`get`, `query`
//! and the scan phase of `query_stream`) run concurrently; `put` and `delete`
//! exclude everyone for the duration of one key. A sync cycle is therefore
//! atomic per key, not per cycle.

use crate::matching::{locator_for, ContentMatcher, ContentMatchers};
use crate::models::{Note, NoteKey, Notebook, NotebookId, Query};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Upper bound for one content-matcher call.
pub const DEFAULT_CONTENT_MATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Process-lifetime index of every note, keyed by [`NoteKey`].
pub struct Store {
    data: RwLock<HashMap<NoteKey, Note>>,
    notebooks: RwLock<Vec<Arc<Notebook>>>,
    matchers: ContentMatchers,
    content_match_timeout: Duration,
}

impl Store {
    /// Create an empty store using `matchers` for binary payloads.
    pub fn new(matchers: ContentMatchers) -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
            notebooks: RwLock::new(Vec::new()),
            matchers,
            content_match_timeout: DEFAULT_CONTENT_MATCH_TIMEOUT,
        }
    }

    /// Bound each content-matcher call; a call that runs longer is a non-match.
    pub fn with_content_match_timeout(mut self, timeout: Duration) -> Self {
        self.content_match_timeout = timeout;
        self
    }

    fn read_data(&self) -> RwLockReadGuard<'_, HashMap<NoteKey, Note>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_data(&self) -> RwLockWriteGuard<'_, HashMap<NoteKey, Note>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a notebook. Returns false if one with the same name exists.
    pub fn create_notebook(&self, notebook: Notebook) -> bool {
        let mut notebooks = self
            .notebooks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if notebooks.iter().any(|nb| nb.id() == notebook.id()) {
            return false;
        }
        debug!(notebook = %notebook.id(), source = notebook.source_kind(), "Notebook registered");
        notebooks.push(Arc::new(notebook));
        true
    }

    pub fn notebook(&self, id: &NotebookId) -> Option<Arc<Notebook>> {
        self.notebooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|nb| nb.id() == id)
            .cloned()
    }

    /// All notebooks in registration order.
    pub fn notebooks(&self) -> Vec<Arc<Notebook>> {
        self.notebooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_notebook(&self, name: &str) -> bool {
        self.notebooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|nb| nb.name() == name)
    }

    pub fn get(&self, key: &NoteKey) -> Option<Note> {
        self.read_data().get(key).cloned()
    }

    /// Insert or replace a note. Its `source` is stamped from the key.
    pub fn put(&self, key: NoteKey, mut note: Note) {
        note.source = Some(key.notebook.clone());
        self.write_data().insert(key, note);
    }

    /// Remove a note. Returns whether it was present.
    pub fn delete(&self, key: &NoteKey) -> bool {
        self.write_data().remove(key).is_some()
    }

    /// Snapshot of every note inside the query's haystack. The needle is ignored.
    pub fn query(&self, query: &Query) -> Vec<Note> {
        self.read_data()
            .iter()
            .filter(|(key, _)| query.covers(key))
            .map(|(_, note)| note.clone())
            .collect()
    }

    /// Stream matching notes into `out`.
    ///
    /// Text fields are scanned under the read lock and matches are sent
    /// immediately. Notes whose MIME type has a content matcher get one
    /// background match each, whether or not a text field already matched,
    /// so such a note may arrive twice. `out` closes once the scan and every
    /// background match have finished.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn query_stream(&self, query: &Query, out: UnboundedSender<Note>) {
        let mut pending: JoinSet<()> = JoinSet::new();
        let needle = if query.match_case {
            query.needle.clone()
        } else {
            query.needle.to_lowercase()
        };

        let mut emitted = 0usize;
        {
            let data = self.read_data();
            for (key, stored) in data.iter() {
                if !query.covers(key) {
                    continue;
                }

                let mut note = stored.clone();
                note.matching_fields.clear();

                if query.needle.is_empty() {
                    let _ = out.send(note);
                    emitted += 1;
                    continue;
                }

                note.matching_fields.extend(
                    Note::searchable_fields()
                        .filter(|desc| {
                            desc.text(stored).map_or(false, |value| {
                                if query.match_case {
                                    value.contains(&needle)
                                } else {
                                    value.to_lowercase().contains(&needle)
                                }
                            })
                        })
                        .map(|desc| desc.name.to_string()),
                );

                if !note.matching_fields.is_empty() {
                    let _ = out.send(note.clone());
                    emitted += 1;
                }

                if let Some(matcher) = self.matchers.for_mime(&note.mime_type) {
                    let tx = out.clone();
                    let pattern = query.needle.clone();
                    let timeout = self.content_match_timeout;
                    pending.spawn(async move {
                        let field_name = matcher.field_name();
                        if content_matches(matcher, &note.uri, pattern, timeout).await {
                            note.matching_fields.push(field_name.to_string());
                            let _ = tx.send(note);
                        }
                    });
                }
            }
        }

        debug!(
            needle = %query.needle,
            emitted = emitted,
            content_matches_pending = pending.len(),
            "Query scan complete"
        );

        tokio::spawn(async move {
            while let Some(result) = pending.join_next().await {
                if let Err(e) = result {
                    warn!("Content match task failed: {}", e);
                }
            }
            // Last sender goes away only after every match has reported
            drop(out);
        });
    }

    /// Run `query_stream` and collect every emission until the stream closes.
    pub async fn search(&self, query: &Query) -> Vec<Note> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.query_stream(query, tx);

        let mut results = Vec::new();
        while let Some(note) = rx.recv().await {
            results.push(note);
        }
        results
    }

    pub fn len(&self) -> usize {
        self.read_data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(ContentMatchers::with_defaults())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("notes", &self.len())
            .field("notebooks", &self.notebooks().len())
            .field("matchers", &self.matchers)
            .finish()
    }
}

async fn content_matches(
    matcher: Arc<dyn ContentMatcher>,
    uri: &str,
    pattern: String,
    limit: Duration,
) -> bool {
    let locator = locator_for(uri);
    let task = tokio::task::spawn_blocking(move || matcher.matches(&locator, &pattern));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(found)) => found,
        Ok(Err(e)) => {
            warn!("Content matcher for {} failed: {}", uri, e);
            false
        }
        Err(_) => {
            warn!("Content match for {} timed out after {:?}", uri, limit);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotebookKind;
    use crate::sources::GoogleSource;

    fn key(notebook: &str, uuid: u64) -> NoteKey {
        NoteKey::new(NotebookId::new(notebook), uuid)
    }

    #[test]
    fn test_put_get_delete() {
        let store = Store::new(ContentMatchers::new());
        store.put(key("work", 1), Note::new(1, "Plan"));

        let note = store.get(&key("work", 1)).unwrap();
        assert_eq!(note.title, "Plan");
        assert_eq!(note.source, Some(NotebookId::new("work")));

        assert!(store.delete(&key("work", 1)));
        assert!(!store.delete(&key("work", 1)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_replaces() {
        let store = Store::new(ContentMatchers::new());
        store.put(key("work", 1), Note::new(1, "Plan"));
        store.put(key("work", 1), Note::new(1, "Revised plan"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key("work", 1)).unwrap().title, "Revised plan");
    }

    #[test]
    fn test_query_filters_by_notebook() {
        let store = Store::new(ContentMatchers::new());
        store.put(key("work", 1), Note::new(1, "a"));
        store.put(key("work", 2), Note::new(2, "b"));
        store.put(key("home", 1), Note::new(1, "c"));

        assert_eq!(store.query(&Query::all()).len(), 3);
        assert_eq!(
            store
                .query(&Query::all().in_notebook(NotebookId::new("work")))
                .len(),
            2
        );
        // needle is not applied by the plain query
        assert_eq!(store.query(&Query::new("zzz")).len(), 3);
    }

    #[test]
    fn test_notebook_registry_rejects_duplicates() {
        let store = Store::new(ContentMatchers::new());
        let make = || {
            Notebook::new(
                "remote",
                Arc::new(GoogleSource::new()),
                HashMap::new(),
                NotebookKind::Configured,
            )
        };

        assert!(store.create_notebook(make()));
        assert!(!store.create_notebook(make()));
        assert_eq!(store.notebooks().len(), 1);
        assert!(store.has_notebook("remote"));
        assert!(store.notebook(&NotebookId::new("remote")).is_some());
        assert!(store.notebook(&NotebookId::new("missing")).is_none());
    }

    #[tokio::test]
    async fn test_search_empty_needle_returns_everything() {
        let store = Store::new(ContentMatchers::new());
        store.put(key("work", 1), Note::new(1, "a"));
        store.put(key("home", 2), Note::new(2, "b"));

        let results = store.search(&Query::all()).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|n| n.matching_fields.is_empty()));
    }

    #[tokio::test]
    async fn test_search_reports_every_matching_field() {
        let store = Store::new(ContentMatchers::new());
        let mut note = Note::new(1, "Alpha release");
        note.body = "notes about alpha".to_string();
        store.put(key("work", 1), note);

        let results = store.search(&Query::new("ALPHA")).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matching_fields, vec!["Title", "Body"]);
    }

    #[tokio::test]
    async fn test_uri_is_not_searchable() {
        let store = Store::new(ContentMatchers::new());
        let mut note = Note::new(1, "Bookmark");
        note.uri = "https://alpha.example.com".to_string();
        store.put(key("web", 1), note);

        assert!(store.search(&Query::new("alpha")).await.is_empty());
    }
}
