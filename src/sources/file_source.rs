//! One note per regular file in a directory.

use crate::error::{SourceError, SourceResult};
use crate::models::{Markup, Note, NoteField, NoteFlags, NoteType};
use crate::sources::run_blocking;
use crate::sources::traits::NoteSource;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs::{self, Metadata, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Editor swap files that are never notes.
static SWAP_FILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|/)\..*\.sw[pon]$|\.sw[pon]$").expect("Failed to compile swap file regex")
});

/// Lookalike of `/` that is legal in file names.
const DIVISION_SLASH: &str = "\u{2215}";

/// Source backed by a flat directory of files.
///
/// Dotfiles are archived notes; the dot is not part of the title. Files
/// containing a NUL byte become `File` notes with an empty body and a
/// `file://` URI.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl NoteSource for FileSource {
    fn kind(&self) -> &'static str {
        "file"
    }

    async fn load_data(&self) -> SourceResult<HashMap<u64, Note>> {
        let dir = self.path.clone();
        run_blocking(move || load_directory(&dir)).await
    }

    async fn can_write(&self) -> SourceResult<bool> {
        let dir = self.path.clone();
        run_blocking(move || {
            // Removed when dropped
            let _probe = tempfile::Builder::new()
                .prefix("tmpfile")
                .tempfile_in(&dir)
                .map_err(|e| SourceError::io(&dir, e))?;
            Ok(true)
        })
        .await
    }

    async fn put_data(&self, note: &Note) -> SourceResult<()> {
        let dir = self.path.clone();
        let note = note.clone();
        run_blocking(move || create_file(&dir, &note)).await
    }

    async fn update_data(&self, old: &Note, new: &Note) -> SourceResult<()> {
        let dir = self.path.clone();
        let old = old.clone();
        let new = new.clone();
        run_blocking(move || update_file(&dir, &old, &new)).await
    }

    async fn delete_data(&self, note: &Note) -> SourceResult<()> {
        let path = self.path.join(file_name_for(note));
        run_blocking(move || {
            fs::remove_file(&path).map_err(|e| match e.kind() {
                ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
                _ => SourceError::io(&path, e),
            })
        })
        .await
    }

    fn supported_properties(&self) -> &'static [(NoteField, bool)] {
        &[
            (NoteField::Title, true),
            (NoteField::Uri, false),
            (NoteField::Body, true),
        ]
    }
}

/// Replace path separators in a title with a lookalike glyph.
pub fn normalize_title(title: &str) -> String {
    title.replace('/', DIVISION_SLASH)
}

/// On-disk name of a note: normalized title, dot-prefixed when archived.
pub fn file_name_for(note: &Note) -> String {
    let name = normalize_title(&note.title);
    if note.is_archived() {
        format!(".{}", name)
    } else {
        name
    }
}

fn load_directory(dir: &Path) -> SourceResult<HashMap<u64, Note>> {
    let entries = fs::read_dir(dir).map_err(|e| SourceError::io(dir, e))?;
    let mut data = HashMap::new();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to read entry in {}: {}", dir.display(), e);
                continue;
            }
        };

        let file_name = entry.file_name().to_string_lossy().into_owned();
        if SWAP_FILE_REGEX.is_match(&file_name) {
            continue;
        }

        let path = entry.path();
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Failed to stat {}: {}", path.display(), e);
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }

        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                continue;
            }
        };

        let note = note_from_file(&path, &file_name, &metadata, &content);
        data.insert(note.uuid, note);
    }

    debug!("Loaded {} notes from {}", data.len(), dir.display());
    Ok(data)
}

fn note_from_file(path: &Path, file_name: &str, metadata: &Metadata, content: &[u8]) -> Note {
    let (title, archived) = match file_name.strip_prefix('.') {
        Some(rest) if !rest.is_empty() => (rest, true),
        _ => (file_name, false),
    };

    let mut note = Note::new(file_id(path, metadata), title);
    note.modified_at = metadata.modified().ok().map(DateTime::<Utc>::from);
    note.created_at = metadata.created().ok().map(DateTime::<Utc>::from);
    if archived {
        note.flags.set(NoteFlags::ARCHIVED);
    }

    if !content.contains(&0) {
        note.body = String::from_utf8_lossy(content).into_owned();
    }

    if note.body.is_empty() {
        note.note_type = NoteType::File;
        note.uri = format!("file://{}", path.display());
        note.mime_type = sniff_mime(content).to_string();
    } else {
        note.note_type = NoteType::Regular;
        note.mime_type = "text/plain".to_string();
        note.markup = markup_for(title);
    }

    note
}

#[cfg(unix)]
fn file_id(_path: &Path, metadata: &Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.ino()
}

#[cfg(not(unix))]
fn file_id(path: &Path, _metadata: &Metadata) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    path.hash(&mut hasher);
    hasher.finish()
}

/// MIME type from leading magic bytes.
pub fn sniff_mime(content: &[u8]) -> &'static str {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"%PDF-", "application/pdf"),
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"OggS", "audio/ogg"),
        (b"ID3", "audio/mpeg"),
    ];

    if content.is_empty() {
        return "text/plain";
    }

    SIGNATURES
        .iter()
        .find(|(magic, _)| content.starts_with(magic))
        .map(|(_, mime)| *mime)
        .unwrap_or("application/octet-stream")
}

fn markup_for(title: &str) -> Markup {
    let lower = title.to_lowercase();
    if lower.ends_with(".md") || lower.ends_with(".markdown") {
        Markup::Markdown
    } else if lower.ends_with(".html") || lower.ends_with(".htm") {
        Markup::Html
    } else if lower == "todo.txt" || lower.ends_with(".todo") {
        Markup::TodoTxt
    } else {
        Markup::None
    }
}

fn create_file(dir: &Path, note: &Note) -> SourceResult<()> {
    let path = dir.join(file_name_for(note));
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => SourceError::AlreadyExists(normalize_title(&note.title)),
            _ => SourceError::io(&path, e),
        })?;

    file.write_all(note.body.as_bytes())
        .map_err(|e| SourceError::io(&path, e))
}

fn update_file(dir: &Path, old: &Note, new: &Note) -> SourceResult<()> {
    let old_path = dir.join(file_name_for(old));
    let new_path = dir.join(file_name_for(new));

    if old_path != new_path {
        if new_path.exists() {
            return Err(SourceError::AlreadyExists(normalize_title(&new.title)));
        }
        fs::rename(&old_path, &new_path).map_err(|e| SourceError::io(&old_path, e))?;
    }

    if new.note_type != NoteType::File {
        fs::write(&new_path, new.body.as_bytes()).map_err(|e| SourceError::io(&new_path, e))?;
    }

    Ok(())
}
