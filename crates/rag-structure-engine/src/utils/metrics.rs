use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

/// Counters shared by every extraction run of one engine.
///
/// Cloning hands out another handle to the same counters, so documents
/// processed in parallel all report here.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    documents_processed: AtomicU64,
    pages_scanned: AtomicU64,
    pages_skipped: AtomicU64,
    chunks_created: AtomicU64,
    heading_chunks: AtomicU64,
    mcq_chunks: AtomicU64,
    paragraphs_split: AtomicU64,
    segmentation_fallbacks: AtomicU64,
    total_processing_time_ms: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                documents_processed: AtomicU64::new(0),
                pages_scanned: AtomicU64::new(0),
                pages_skipped: AtomicU64::new(0),
                chunks_created: AtomicU64::new(0),
                heading_chunks: AtomicU64::new(0),
                mcq_chunks: AtomicU64::new(0),
                paragraphs_split: AtomicU64::new(0),
                segmentation_fallbacks: AtomicU64::new(0),
                total_processing_time_ms: AtomicU64::new(0),
            }),
        }
    }

    pub fn increment_documents_processed(&self) {
        self.inner.documents_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_pages_scanned(&self, count: u64) {
        self.inner.pages_scanned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_pages_skipped(&self, count: u64) {
        self.inner.pages_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_chunks_created(&self, count: u64) {
        self.inner.chunks_created.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_heading_chunks(&self, count: u64) {
        self.inner.heading_chunks.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_mcq_chunks(&self, count: u64) {
        self.inner.mcq_chunks.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_paragraphs_split(&self, count: u64) {
        self.inner.paragraphs_split.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_segmentation_fallbacks(&self, count: u64) {
        self.inner
            .segmentation_fallbacks
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_processing_time(&self, duration: Duration) {
        self.inner
            .total_processing_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn get_documents_processed(&self) -> u64 {
        self.inner.documents_processed.load(Ordering::Relaxed)
    }

    pub fn get_pages_scanned(&self) -> u64 {
        self.inner.pages_scanned.load(Ordering::Relaxed)
    }

    pub fn get_pages_skipped(&self) -> u64 {
        self.inner.pages_skipped.load(Ordering::Relaxed)
    }

    pub fn get_chunks_created(&self) -> u64 {
        self.inner.chunks_created.load(Ordering::Relaxed)
    }

    pub fn get_heading_chunks(&self) -> u64 {
        self.inner.heading_chunks.load(Ordering::Relaxed)
    }

    pub fn get_mcq_chunks(&self) -> u64 {
        self.inner.mcq_chunks.load(Ordering::Relaxed)
    }

    pub fn get_paragraphs_split(&self) -> u64 {
        self.inner.paragraphs_split.load(Ordering::Relaxed)
    }

    pub fn get_segmentation_fallbacks(&self) -> u64 {
        self.inner.segmentation_fallbacks.load(Ordering::Relaxed)
    }

    pub fn get_total_processing_time_ms(&self) -> u64 {
        self.inner.total_processing_time_ms.load(Ordering::Relaxed)
    }

    pub fn get_average_processing_time_ms(&self) -> f64 {
        let processed = self.get_documents_processed();
        if processed == 0 {
            return 0.0;
        }

        let total_time = self.get_total_processing_time_ms();
        total_time as f64 / processed as f64
    }

    pub fn log_summary(&self) {
        info!(
            documents = self.get_documents_processed(),
            pages_scanned = self.get_pages_scanned(),
            pages_skipped = self.get_pages_skipped(),
            chunks = self.get_chunks_created(),
            headings = self.get_heading_chunks(),
            mcqs = self.get_mcq_chunks(),
            paragraphs_split = self.get_paragraphs_split(),
            segmentation_fallbacks = self.get_segmentation_fallbacks(),
            "Structure extraction summary (avg {:.2}ms per document)",
            self.get_average_processing_time_ms()
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock timer for one extraction run.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
