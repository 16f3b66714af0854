//! Shared test doubles for sources and content matchers.

pub mod mock_content_matcher;
pub mod mock_note_source;

#[allow(unused_imports)]
pub use mock_content_matcher::MockContentMatcher;
#[allow(unused_imports)]
pub use mock_note_source::MockNoteSource;
