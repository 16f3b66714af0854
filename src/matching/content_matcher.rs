use crate::matching::pdf_matcher::{PdfContentMatcher, PDF_MIME_TYPE};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Matches a search pattern against the extracted text of a document.
///
/// Calls block and run on Tokio's blocking pool. Unreadable documents are a
/// non-match, never an error.
pub trait ContentMatcher: Send + Sync {
    /// Whether the document at `locator` contains `pattern`, ignoring case.
    fn matches(&self, locator: &Path, pattern: &str) -> bool;

    /// Name appended to `matching_fields` on a hit.
    fn field_name(&self) -> &'static str;
}

/// Content matchers keyed by MIME type.
#[derive(Clone, Default)]
pub struct ContentMatchers {
    by_mime: HashMap<String, Arc<dyn ContentMatcher>>,
}

impl ContentMatchers {
    /// Registry with no matchers; only text fields are searched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the PDF matcher installed.
    pub fn with_defaults() -> Self {
        Self::new().register(PDF_MIME_TYPE, Arc::new(PdfContentMatcher::new()))
    }

    pub fn register(
        mut self,
        mime_type: impl Into<String>,
        matcher: Arc<dyn ContentMatcher>,
    ) -> Self {
        self.by_mime.insert(mime_type.into(), matcher);
        self
    }

    pub fn for_mime(&self, mime_type: &str) -> Option<Arc<dyn ContentMatcher>> {
        self.by_mime.get(mime_type).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mime.is_empty()
    }
}

impl fmt::Debug for ContentMatchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut mime_types: Vec<&String> = self.by_mime.keys().collect();
        mime_types.sort();
        f.debug_struct("ContentMatchers")
            .field("mime_types", &mime_types)
            .finish()
    }
}

/// Filesystem path of a note URI.
pub fn locator_for(uri: &str) -> PathBuf {
    PathBuf::from(uri.strip_prefix("file://").unwrap_or(uri))
}
