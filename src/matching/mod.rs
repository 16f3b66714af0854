//! Content matching for binary note payloads.
//!
//! Text fields are matched by the store itself; documents whose text has to
//! be extracted first (PDF) are handed to a [`ContentMatcher`] chosen by MIME
//! type.

pub mod content_matcher;
pub mod pdf_matcher;

pub use content_matcher::{locator_for, ContentMatcher, ContentMatchers};
pub use pdf_matcher::{PdfContentMatcher, PDF_MIME_TYPE};
