//! Note sources: one implementation per backend kind.
//!
//! Every source satisfies [`NoteSource`]. Blocking backend I/O runs on
//! Tokio's blocking pool so loads of different notebooks proceed in parallel.

mod file_source;
mod google_source;
mod mozilla_source;
mod traits;

pub use file_source::{file_name_for, normalize_title, sniff_mime, FileSource};
pub use google_source::GoogleSource;
pub use mozilla_source::{discover_profiles, MozillaSource};
pub use traits::NoteSource;

use crate::error::{ConfigError, ConfigResult, SourceError, SourceResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Source kind used when a section has a `path` but no `impl`.
pub const DEFAULT_SOURCE_KIND: &str = "file";

/// Run blocking backend work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> SourceResult<T>
where
    F: FnOnce() -> SourceResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SourceError::TaskFailed(e.to_string()))?
}

/// Source kind requested by a configuration section.
pub fn resolve_kind(config: &HashMap<String, String>) -> Option<&str> {
    match config.get("impl") {
        Some(kind) => Some(kind.as_str()),
        None if config.contains_key("path") => Some(DEFAULT_SOURCE_KIND),
        None => None,
    }
}

/// Build the source a configuration section describes.
pub fn source_for(
    section: &str,
    config: &HashMap<String, String>,
) -> ConfigResult<Arc<dyn NoteSource>> {
    let kind = resolve_kind(config).ok_or_else(|| ConfigError::InvalidValue {
        var: format!("[{}].impl", section),
        reason: "Section needs an impl or a path".to_string(),
    })?;

    let require_path = || {
        config
            .get("path")
            .cloned()
            .ok_or_else(|| ConfigError::InvalidValue {
                var: format!("[{}].path", section),
                reason: format!("Required for {} sources", kind),
            })
    };

    let source: Arc<dyn NoteSource> = match kind {
        "file" => Arc::new(FileSource::new(require_path()?)),
        "mozilla" => Arc::new(MozillaSource::new(require_path()?)),
        "google" => Arc::new(GoogleSource::new()),
        other => {
            return Err(ConfigError::UnknownSource {
                section: section.to_string(),
                kind: other.to_string(),
            })
        }
    };

    Ok(source)
}
