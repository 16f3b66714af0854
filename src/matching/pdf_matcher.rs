//! PDF text search through pdfium.
//!
//! The pdfium library is bound once per process from the system library
//! path. When it is missing every PDF is simply a non-match.

use crate::matching::content_matcher::ContentMatcher;
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Pdfium handle that can live in a `static`.
///
/// The `thread_safe` feature serializes every call into the library.
struct SyncPdfium(Pdfium);

// SAFETY: pdfium-render's `thread_safe` feature guards all library access with a mutex
unsafe impl Send for SyncPdfium {}
unsafe impl Sync for SyncPdfium {}

static PDFIUM_INSTANCE: OnceLock<Result<SyncPdfium, String>> = OnceLock::new();

fn load_pdfium() -> Result<&'static Pdfium, String> {
    PDFIUM_INSTANCE
        .get_or_init(|| match Pdfium::bind_to_system_library() {
            Ok(bindings) => {
                info!("Using system pdfium library");
                Ok(SyncPdfium(Pdfium::new(bindings)))
            }
            Err(e) => {
                warn!("No pdfium library available, PDF content will not be searched: {:?}", e);
                Err(format!("{:?}", e))
            }
        })
        .as_ref()
        .map(|sp| &sp.0)
        .map_err(|e| e.clone())
}

/// Case-insensitive page-by-page search, stopping at the first hit.
fn document_contains(pdfium: &Pdfium, path: &Path, pattern: &str) -> Result<bool, PdfiumError> {
    let document = pdfium.load_pdf_from_file(path, None)?;
    let needle = pattern.to_lowercase();

    for (index, page) in document.pages().iter().enumerate() {
        let text = match page.text() {
            Ok(text_page) => text_page.all(),
            Err(e) => {
                debug!("Failed to extract text from page {} of {}: {:?}", index, path.display(), e);
                continue;
            }
        };

        if text.to_lowercase().contains(&needle) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Matches text inside PDF documents.
#[derive(Debug, Default, Clone)]
pub struct PdfContentMatcher;

impl PdfContentMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl ContentMatcher for PdfContentMatcher {
    fn matches(&self, locator: &Path, pattern: &str) -> bool {
        let pdfium = match load_pdfium() {
            Ok(pdfium) => pdfium,
            Err(_) => return false,
        };

        match document_contains(pdfium, locator, pattern) {
            Ok(found) => found,
            Err(e) => {
                debug!("Cannot search {}: {:?}", locator.display(), e);
                false
            }
        }
    }

    fn field_name(&self) -> &'static str {
        "PDF content"
    }
}
