use crate::error::{SourceError, SourceResult};
use crate::models::{Note, NoteField};
use crate::sources::traits::NoteSource;
use async_trait::async_trait;
use std::collections::HashMap;

/// Placeholder for a cloud notes service. Loads nothing, writes nothing.
#[derive(Debug, Default, Clone)]
pub struct GoogleSource;

impl GoogleSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NoteSource for GoogleSource {
    fn kind(&self) -> &'static str {
        "google"
    }

    async fn load_data(&self) -> SourceResult<HashMap<u64, Note>> {
        Ok(HashMap::new())
    }

    async fn can_write(&self) -> SourceResult<bool> {
        Err(SourceError::unsupported(
            "creating new items is not currently supported",
        ))
    }

    async fn put_data(&self, _note: &Note) -> SourceResult<()> {
        Err(SourceError::unsupported("creating items is not currently supported"))
    }

    async fn update_data(&self, _old: &Note, _new: &Note) -> SourceResult<()> {
        Err(SourceError::unsupported("editing items is not currently supported"))
    }

    async fn delete_data(&self, _note: &Note) -> SourceResult<()> {
        Err(SourceError::unsupported("deleting items is not currently supported"))
    }

    fn supported_properties(&self) -> &'static [(NoteField, bool)] {
        &[
            (NoteField::Title, false),
            (NoteField::Uri, false),
            (NoteField::Body, false),
        ]
    }
}
