//! Firefox bookmarks read straight from a profile's `places.sqlite`.

use crate::error::{SourceError, SourceResult};
use crate::models::{Note, NoteField, NoteFlags, NoteType};
use crate::sources::run_blocking;
use crate::sources::traits::NoteSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OpenFlags};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Profile directories below the home directory, Linux then macOS.
const PROFILE_ROOTS: [&str; 2] = [
    ".mozilla/firefox",
    "Library/Application Support/Firefox/Profiles",
];

static PROFILE_DIR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+)\.default(?:-release)?$").expect("Failed to compile profile regex")
});

const BOOKMARKS_QUERY: &str = "SELECT b.id, ifnull(b.title, ''), p.url, ifnull(p.description, ''),
            b.dateAdded, b.lastModified
     FROM moz_bookmarks b JOIN moz_places p ON b.fk = p.id";

/// Read-only source over one Firefox profile's bookmarks.
#[derive(Debug, Clone)]
pub struct MozillaSource {
    path: PathBuf,
}

impl MozillaSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl NoteSource for MozillaSource {
    fn kind(&self) -> &'static str {
        "mozilla"
    }

    async fn load_data(&self) -> SourceResult<HashMap<u64, Note>> {
        let path = self.path.clone();
        run_blocking(move || load_bookmarks(&path)).await
    }

    async fn can_write(&self) -> SourceResult<bool> {
        Err(SourceError::unsupported(
            "Creating new bookmarks is not supported yet",
        ))
    }

    async fn put_data(&self, _note: &Note) -> SourceResult<()> {
        Err(SourceError::unsupported(
            "Creating bookmarks is not currently supported",
        ))
    }

    async fn update_data(&self, _old: &Note, _new: &Note) -> SourceResult<()> {
        Err(SourceError::unsupported(
            "Editing bookmarks is not currently supported",
        ))
    }

    async fn delete_data(&self, _note: &Note) -> SourceResult<()> {
        Err(SourceError::unsupported(
            "Deleting bookmarks is not currently supported",
        ))
    }

    fn supported_properties(&self) -> &'static [(NoteField, bool)] {
        &[
            (NoteField::Title, false),
            (NoteField::Uri, false),
            (NoteField::Body, false),
        ]
    }
}

/// Open the database immutable so Firefox's exclusive lock does not block us.
fn open_places(path: &Path) -> SourceResult<Connection> {
    let uri = format!("file:{}?immutable=1", uri_path(path));
    let conn = Connection::open_with_flags(
        uri,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI,
    )?;
    Ok(conn)
}

/// Percent-encode each path segment so `?`, `#` and `%` stay part of the name.
fn uri_path(path: &Path) -> String {
    path.to_string_lossy()
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn load_bookmarks(path: &Path) -> SourceResult<HashMap<u64, Note>> {
    let conn = open_places(path)?;
    let mut stmt = conn.prepare(BOOKMARKS_QUERY)?;

    let rows = stmt.query_map([], |row| {
        let id: i64 = row.get(0)?;
        let title: String = row.get(1)?;
        let url: String = row.get(2)?;
        let description: String = row.get(3)?;
        let date_added: Option<i64> = row.get(4)?;
        let last_modified: Option<i64> = row.get(5)?;

        let mut note = Note::new(id as u64, title);
        note.body = description;
        note.uri = url;
        note.note_type = NoteType::Bookmark;
        note.flags.set(NoteFlags::READ_ONLY);
        note.created_at = date_added.and_then(from_prtime);
        note.modified_at = last_modified.and_then(from_prtime);
        Ok(note)
    })?;

    let mut data = HashMap::new();
    for row in rows {
        match row {
            Ok(note) => {
                data.insert(note.uuid, note);
            }
            Err(e) => warn!("Skipping malformed bookmark row: {}", e),
        }
    }

    debug!("Loaded {} bookmarks from {}", data.len(), path.display());
    Ok(data)
}

/// Firefox stores microseconds since the epoch; zero means unknown.
fn from_prtime(micros: i64) -> Option<DateTime<Utc>> {
    if micros == 0 {
        return None;
    }
    DateTime::from_timestamp_micros(micros)
}

/// Find Firefox profiles with a bookmark database below `home`.
///
/// Returns profile name to `places.sqlite` path.
pub fn discover_profiles(home: &Path) -> BTreeMap<String, PathBuf> {
    let mut profiles = BTreeMap::new();

    for root in PROFILE_ROOTS {
        let base_dir = home.join(root);
        let entries = match fs::read_dir(&base_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("No Firefox profiles in {}: {}", base_dir.display(), e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let dir_name = entry.file_name().to_string_lossy().into_owned();
            if !dir_name.contains("default") || !entry.path().is_dir() {
                continue;
            }

            let places_file = entry.path().join("places.sqlite");
            if !places_file.is_file() {
                debug!("Profile {} has no places.sqlite", dir_name);
                continue;
            }

            if let Some(caps) = PROFILE_DIR_REGEX.captures(&dir_name) {
                debug!("Discovered Firefox profile at {}", places_file.display());
                profiles.insert(caps[1].to_string(), places_file);
            }
        }
    }

    profiles
}
