use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

use crate::builder::ChunkBuilder;
use crate::config::Settings;
use crate::document::{Page, SentenceSegmenter, TextChunk, UnicodeSentenceSegmenter};
use crate::outline::{Outline, OutlineMetadata, OutlineScanner};
use crate::utils::metrics::{Metrics, Timer};

/// Two-pass pipeline: outline scan, then chunk building.
///
/// Holds no per-document state, so one engine can serve many documents at
/// once. Metrics are shared across all runs.
pub struct StructureEngine {
    settings: Settings,
    segmenter: Arc<dyn SentenceSegmenter>,
    metrics: Metrics,
}

impl StructureEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            settings: settings.clone(),
            segmenter: Arc::new(UnicodeSentenceSegmenter),
            metrics: Metrics::new(),
        }
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        self.segmenter = segmenter;
        self
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Chunks come back in `position` order. Never fails: malformed pages are
    /// skipped and an empty document yields an empty outline.
    pub fn extract_structure(&self, pages: &[Page]) -> (Vec<TextChunk>, Outline) {
        let timer = Timer::new();

        let valid: Vec<Page> = pages
            .iter()
            .filter(|page| match page.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping page: {}", e);
                    false
                }
            })
            .cloned()
            .collect();

        let skipped = (pages.len() - valid.len()) as u64;
        self.metrics.add_pages_skipped(skipped);

        if valid.is_empty() {
            warn!("Document has no usable pages, returning empty structure");
            self.metrics.increment_documents_processed();
            self.metrics.add_processing_time(timer.elapsed());
            return (Vec::new(), Outline::empty());
        }

        info!("📖 Scanning outline over {} pages", valid.len());
        let skeleton = OutlineScanner::new(self.settings.outline.clone()).scan(&valid);

        info!("✂️  Building chunks");
        let built = ChunkBuilder::new(self.settings.chunking.clone(), self.segmenter.as_ref())
            .build(&valid, &skeleton.chapters);

        let outline = Outline {
            title: skeleton.title,
            chapters: skeleton.chapters,
            sections: built.sections,
            mcq_index: built.mcq_index,
            metadata: OutlineMetadata {
                total_pages: valid.len(),
                extracted_at: chrono::Utc::now(),
            },
        };

        self.metrics.increment_documents_processed();
        self.metrics.add_pages_scanned(valid.len() as u64);
        self.metrics.add_chunks_created(built.chunks.len() as u64);
        self.metrics.add_heading_chunks(built.stats.heading_chunks);
        self.metrics.add_mcq_chunks(built.stats.mcq_chunks);
        self.metrics.add_paragraphs_split(built.stats.paragraphs_split);
        self.metrics
            .add_segmentation_fallbacks(built.stats.segmentation_fallbacks);
        self.metrics.add_processing_time(timer.elapsed());

        info!(
            "✅ Extracted {} chunks, {} chapters in {:?}",
            built.chunks.len(),
            outline.chapters.len(),
            timer.elapsed()
        );

        (built.chunks, outline)
    }

    /// One independent extraction per document, run in parallel. Results keep
    /// the input order.
    pub fn extract_many(&self, documents: &[Vec<Page>]) -> Vec<(Vec<TextChunk>, Outline)> {
        let results: Vec<_> = documents
            .par_iter()
            .map(|pages| self.extract_structure(pages))
            .collect();

        self.metrics.log_summary();
        results
    }
}

impl Default for StructureEngine {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

/// Extract with default settings.
pub fn extract_structure(pages: &[Page]) -> (Vec<TextChunk>, Outline) {
    StructureEngine::default().extract_structure(pages)
}
