/// Error sink: the ordered list of non-fatal crawl errors
use crate::CrawlError;

/// Errors recorded while a crawl runs, in the order they happened
#[derive(Debug, Clone, Default)]
pub struct ErrorSink {
    errors: Vec<CrawlError>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error
    pub fn push(&mut self, error: CrawlError) {
        tracing::warn!("{}", error);
        self.errors.push(error);
    }

    /// The first error recorded, which becomes the crawl's overall failure
    pub fn first(&self) -> Option<&CrawlError> {
        self.errors.first()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn as_slice(&self) -> &[CrawlError] {
        &self.errors
    }
}
