use notefinder_core::matching::ContentMatcher;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock content matcher: documents "contain" whatever text was registered
/// for their path.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockContentMatcher {
    documents: Arc<Mutex<Vec<(PathBuf, String)>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockContentMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_document(&self, path: impl Into<PathBuf>, text: &str) {
        self.documents
            .lock()
            .unwrap()
            .push((path.into(), text.to_lowercase()));
    }

    /// Sleep this long inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ContentMatcher for MockContentMatcher {
    fn matches(&self, locator: &Path, pattern: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let needle = pattern.to_lowercase();
        self.documents
            .lock()
            .unwrap()
            .iter()
            .any(|(path, text)| path == locator && text.contains(&needle))
    }

    fn field_name(&self) -> &'static str {
        "PDF content"
    }
}
