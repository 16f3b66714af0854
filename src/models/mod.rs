//! Data models for notes, notebooks, and queries.
//!
//! This module contains the canonical note representation every source
//! normalizes into, the notebook handle that owns a source, and the key and
//! query types used by the store.

pub mod note;
pub mod notebook;
pub mod query;

pub use note::{FieldDescriptor, Markup, Note, NoteField, NoteFlags, NoteType, NOTE_FIELDS};
pub use notebook::{Notebook, NotebookId, NotebookKind};
pub use query::{NoteKey, Query, QueryMethod};
