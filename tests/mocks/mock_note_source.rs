use async_trait::async_trait;
use notefinder_core::error::{SourceError, SourceResult};
use notefinder_core::models::{Note, NoteField};
use notefinder_core::sources::NoteSource;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Mock note source for testing.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// notebook.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockNoteSource {
    notes: Arc<Mutex<HashMap<u64, Note>>>,
    failing: Arc<AtomicBool>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
}

#[allow(dead_code)]
impl MockNoteSource {
    pub fn new() -> Self {
        Self {
            notes: Arc::new(Mutex::new(HashMap::new())),
            failing: Arc::new(AtomicBool::new(false)),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_notes(notes_list: Vec<Note>) -> Self {
        let source = Self::new();
        source.set_notes(notes_list);
        source
    }

    /// Replace everything the next load returns.
    pub fn set_notes(&self, notes_list: Vec<Note>) {
        let mut notes = self.notes.lock().unwrap();
        notes.clear();
        for note in notes_list {
            notes.insert(note.uuid, note);
        }
    }

    pub fn upsert(&self, note: Note) {
        self.notes.lock().unwrap().insert(note.uuid, note);
    }

    pub fn remove(&self, uuid: u64) {
        self.notes.lock().unwrap().remove(&uuid);
    }

    /// Make every following load fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get_call_count(&self, method: &str) -> usize {
        let counts = self.call_counts.lock().unwrap();
        *counts.get(method).unwrap_or(&0)
    }

    pub fn reset_call_counts(&self) {
        self.call_counts.lock().unwrap().clear();
    }

    fn track_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }
}

impl Default for MockNoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteSource for MockNoteSource {
    fn kind(&self) -> &'static str {
        "mock"
    }

    async fn load_data(&self) -> SourceResult<HashMap<u64, Note>> {
        self.track_call("load_data");

        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unsupported("mock source unavailable".to_string()));
        }
        Ok(self.notes.lock().unwrap().clone())
    }

    async fn can_write(&self) -> SourceResult<bool> {
        self.track_call("can_write");
        Ok(true)
    }

    async fn put_data(&self, note: &Note) -> SourceResult<()> {
        self.track_call("put_data");

        let mut notes = self.notes.lock().unwrap();
        if notes.contains_key(&note.uuid) {
            return Err(SourceError::AlreadyExists(note.title.clone()));
        }
        notes.insert(note.uuid, note.clone());
        Ok(())
    }

    async fn update_data(&self, old: &Note, new: &Note) -> SourceResult<()> {
        self.track_call("update_data");

        let mut notes = self.notes.lock().unwrap();
        if notes.remove(&old.uuid).is_none() {
            return Err(SourceError::NotFound(old.title.clone()));
        }
        notes.insert(new.uuid, new.clone());
        Ok(())
    }

    async fn delete_data(&self, note: &Note) -> SourceResult<()> {
        self.track_call("delete_data");

        match self.notes.lock().unwrap().remove(&note.uuid) {
            Some(_) => Ok(()),
            None => Err(SourceError::NotFound(note.title.clone())),
        }
    }

    fn supported_properties(&self) -> &'static [(NoteField, bool)] {
        &[(NoteField::Title, true), (NoteField::Body, true)]
    }
}
