//! Per-note term frequencies built from changed notes on the bus.

use crate::bus::BusReader;
use crate::models::{Note, NoteKey};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, info};

/// Runs of whitespace, including NBSP and its HTML entity.
static WHITESPACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\s|\x{a0}|&nbsp;)+").expect("Invalid whitespace regex"));

/// Leading or trailing punctuation and symbols.
static EDGE_PUNCTUATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{P}\p{S}\x{ad}]+|[\p{P}\p{S}\x{ad}]+$").expect("Invalid punctuation regex")
});

/// Shortest term that is kept, in characters.
const MIN_TERM_CHARS: usize = 3;

/// Count terms across a note's searchable fields.
pub fn term_frequencies(note: &Note) -> HashMap<String, usize> {
    let mut terms = HashMap::new();

    for desc in Note::searchable_fields() {
        let Some(raw) = desc.text(note) else {
            continue;
        };
        // `+` is an encoded space
        let raw = raw.replace('+', " ");
        let text = match urlencoding::decode(&raw) {
            Ok(text) => text,
            Err(e) => {
                debug!(field = desc.name, "Skipping undecodable field: {}", e);
                continue;
            }
        };

        for word in WHITESPACE_REGEX.split(&text) {
            let term = EDGE_PUNCTUATION_REGEX.replace_all(word, "").to_lowercase();
            if term.chars().count() < MIN_TERM_CHARS || term.chars().all(char::is_numeric) {
                continue;
            }
            *terms.entry(term).or_insert(0) += 1;
        }
    }

    terms
}

/// Bus consumer that keeps term frequencies for every note it has seen.
#[derive(Debug, Default)]
pub struct TermIndexer {
    index: RwLock<HashMap<NoteKey, HashMap<String, usize>>>,
}

impl TermIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the bus until it closes. Returns the number of notes processed.
    pub async fn run(&self, mut reader: BusReader) -> usize {
        let mut processed = 0;
        while let Some(note) = reader.read().await {
            self.index_note(&note);
            processed += 1;
        }
        info!(processed = processed, "Event bus closed, term indexer finished");
        processed
    }

    /// Index one note, replacing what was recorded for it before.
    pub fn index_note(&self, note: &Note) {
        let Some(notebook) = note.source.clone() else {
            debug!(uuid = note.uuid, "Note without a notebook, not indexed");
            return;
        };

        let terms = term_frequencies(note);
        debug!(title = %note.title, terms = terms.len(), "Indexed note");
        self.index
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(NoteKey::new(notebook, note.uuid), terms);
    }

    pub fn frequencies(&self, key: &NoteKey) -> Option<HashMap<String, usize>> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Keys of every note containing `term`, lowercased before lookup.
    pub fn notes_with_term(&self, term: &str) -> Vec<NoteKey> {
        let term = term.to_lowercase();
        let mut keys: Vec<NoteKey> = self
            .index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, terms)| terms.contains_key(&term))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn indexed_count(&self) -> usize {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
