//! Canonical note representation shared by every source.

use crate::models::notebook::NotebookId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Kind of item a note was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NoteType {
    #[default]
    Regular,
    Bookmark,
    Voice,
    File,
    TodoList,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::Bookmark => "Bookmark",
            Self::Voice => "Voice",
            Self::File => "File",
            Self::TodoList => "TodoList",
        }
    }
}

/// Markup language of the note body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Markup {
    #[default]
    None,
    Markdown,
    Html,
    TodoTxt,
}

/// Independent boolean facets of a note, stored as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct NoteFlags(u32);

impl NoteFlags {
    pub const ARCHIVED: u32 = 1 << 0;
    pub const READ_ONLY: u32 = 1 << 1;
    pub const NOTIFY: u32 = 1 << 2;
    pub const STARRED: u32 = 1 << 3;
    pub const ENCRYPTED: u32 = 1 << 4;

    pub fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn set(&mut self, flag: u32) {
        self.0 |= flag;
    }

    pub fn unset(&mut self, flag: u32) {
        self.0 &= !flag;
    }

    pub fn contains(&self, flag: u32) -> bool {
        self.0 & flag != 0
    }
}

/// 32 `+`/`-` characters, most significant bit first.
impl fmt::Display for NoteFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: String = (0..32)
            .rev()
            .map(|bit| if self.0 & (1 << bit) != 0 { '+' } else { '-' })
            .collect();
        f.write_str(&rendered)
    }
}

/// A unit of content from any backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Note {
    /// Owning notebook, stamped by the synchronizer
    pub source: Option<NotebookId>,

    /// Backend-local identifier, unique within one notebook only
    pub uuid: u64,

    pub title: String,

    /// Empty for binary items
    pub body: String,

    pub tags: Vec<String>,

    /// Set for links and file-backed binary items
    pub uri: String,

    pub mime_type: String,

    pub created_at: Option<DateTime<Utc>>,

    pub modified_at: Option<DateTime<Utc>>,

    pub flags: NoteFlags,

    pub note_type: NoteType,

    pub markup: Markup,

    /// Field names that matched the query this copy was produced for
    pub matching_fields: Vec<String>,
}

impl Note {
    /// Create a new note with required fields.
    pub fn new(uuid: u64, title: impl Into<String>) -> Self {
        Self {
            uuid,
            title: title.into(),
            matching_fields: Vec::with_capacity(4),
            ..Default::default()
        }
    }

    /// Whether two notes describe the same observed state of an item.
    ///
    /// A differing modification time always counts as a change.
    pub fn same_as(&self, other: &Note) -> bool {
        if self.modified_at != other.modified_at {
            return false;
        }
        self.uuid == other.uuid
            && self.title == other.title
            && self.body == other.body
            && self.uri == other.uri
            && self.flags == other.flags
    }

    pub fn is_archived(&self) -> bool {
        self.flags.contains(NoteFlags::ARCHIVED)
    }

    /// Value of a field as text, for fields that have a textual form.
    pub fn field_text(&self, field: NoteField) -> Option<&str> {
        NOTE_FIELDS
            .iter()
            .find(|desc| desc.id == field)
            .and_then(|desc| desc.text(self))
    }

    /// Descriptors of the fields queries run against.
    pub fn searchable_fields() -> impl Iterator<Item = &'static FieldDescriptor> {
        NOTE_FIELDS.iter().filter(|desc| desc.searchable)
    }
}

/// Identifies one field of a [`Note`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteField {
    Uuid,
    Title,
    Body,
    Uri,
    MimeType,
    Type,
    Flags,
}

/// Static description of a note field.
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    pub id: NoteField,
    /// Name reported in `matching_fields`
    pub name: &'static str,
    /// Textual value, `None` for fields without one
    pub getter: fn(&Note) -> Option<&str>,
    pub searchable: bool,
}

impl FieldDescriptor {
    pub fn text<'a>(&self, note: &'a Note) -> Option<&'a str> {
        (self.getter)(note)
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("searchable", &self.searchable)
            .finish()
    }
}

fn no_text(_: &Note) -> Option<&str> {
    None
}

fn title_text(note: &Note) -> Option<&str> {
    Some(&note.title)
}

fn body_text(note: &Note) -> Option<&str> {
    Some(&note.body)
}

fn uri_text(note: &Note) -> Option<&str> {
    Some(&note.uri)
}

fn mime_type_text(note: &Note) -> Option<&str> {
    Some(&note.mime_type)
}

fn type_text(note: &Note) -> Option<&str> {
    Some(note.note_type.as_str())
}

pub const NOTE_FIELDS: [FieldDescriptor; 7] = [
    FieldDescriptor {
        id: NoteField::Uuid,
        name: "UUID",
        getter: no_text,
        searchable: false,
    },
    FieldDescriptor {
        id: NoteField::Title,
        name: "Title",
        getter: title_text,
        searchable: true,
    },
    FieldDescriptor {
        id: NoteField::Body,
        name: "Body",
        getter: body_text,
        searchable: true,
    },
    FieldDescriptor {
        id: NoteField::Uri,
        name: "URI",
        getter: uri_text,
        searchable: false,
    },
    FieldDescriptor {
        id: NoteField::MimeType,
        name: "MimeType",
        getter: mime_type_text,
        searchable: false,
    },
    FieldDescriptor {
        id: NoteField::Type,
        name: "Type",
        getter: type_text,
        searchable: false,
    },
    FieldDescriptor {
        id: NoteField::Flags,
        name: "flags",
        getter: no_text,
        searchable: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_note() -> Note {
        let mut note = Note::new(42, "Groceries");
        note.body = "milk, eggs".to_string();
        note.uri = "file:///tmp/groceries".to_string();
        note.modified_at = Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
        note
    }

    #[test]
    fn test_same_as_identical() {
        let a = sample_note();
        let b = sample_note();
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_same_as_modified_at_only() {
        let a = sample_note();
        let mut b = sample_note();
        b.modified_at = Some(Utc.with_ymd_and_hms(2024, 1, 16, 10, 0, 0).unwrap());
        assert!(!a.same_as(&b));

        b.modified_at = None;
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_same_as_ignores_transient_fields() {
        let a = sample_note();
        let mut b = sample_note();
        b.matching_fields.push("Body".to_string());
        b.mime_type = "text/plain".to_string();
        b.tags.push("shopping".to_string());
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_same_as_detects_flag_change() {
        let a = sample_note();
        let mut b = sample_note();
        b.flags.set(NoteFlags::STARRED);
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_flags_combine_independently() {
        let mut flags = NoteFlags::default();
        flags.set(NoteFlags::ARCHIVED);
        flags.set(NoteFlags::ENCRYPTED);
        assert!(flags.contains(NoteFlags::ARCHIVED));
        assert!(flags.contains(NoteFlags::ENCRYPTED));
        assert!(!flags.contains(NoteFlags::READ_ONLY));

        flags.unset(NoteFlags::ARCHIVED);
        assert!(!flags.contains(NoteFlags::ARCHIVED));
        assert_eq!(flags.bits(), NoteFlags::ENCRYPTED);
    }

    #[test]
    fn test_flags_display() {
        let flags = NoteFlags::from_bits(NoteFlags::ARCHIVED | NoteFlags::NOTIFY);
        let rendered = flags.to_string();
        assert_eq!(rendered.len(), 32);
        assert!(rendered.ends_with("+-+"));
        assert_eq!(rendered.matches('+').count(), 2);
    }

    #[test]
    fn test_only_title_and_body_searchable() {
        let names: Vec<&str> = Note::searchable_fields().map(|d| d.name).collect();
        assert_eq!(names, vec!["Title", "Body"]);
    }

    #[test]
    fn test_field_text_lookup() {
        let note = sample_note();
        let body = NOTE_FIELDS.iter().find(|d| d.id == NoteField::Body).unwrap();
        assert_eq!(body.text(&note), Some("milk, eggs"));
        assert_eq!(note.field_text(NoteField::Type), Some("Regular"));
        assert_eq!(note.field_text(NoteField::Flags), None);
    }

    #[test]
    fn test_every_descriptor_reads_its_own_field() {
        let note = sample_note();
        let texts: Vec<(&str, Option<&str>)> =
            NOTE_FIELDS.iter().map(|d| (d.name, d.text(&note))).collect();
        assert_eq!(
            texts,
            vec![
                ("UUID", None),
                ("Title", Some("Groceries")),
                ("Body", Some("milk, eggs")),
                ("URI", Some("file:///tmp/groceries")),
                ("MimeType", Some(note.mime_type.as_str())),
                ("Type", Some("Regular")),
                ("flags", None),
            ]
        );
    }
}
