use std::collections::BTreeMap;
use tracing::debug;

use crate::config::ChunkingConfig;
use crate::document::chunk::{HEADING_IMPORTANCE, TEXT_IMPORTANCE};
use crate::document::sentence::split_with_outcome;
use crate::document::{
    classify, split_paragraphs, ChunkType, McqRecord, Page, ParagraphKind, SentenceSegmenter,
    TextChunk,
};
use crate::outline::{detect_chapters, ChapterBoundary, FRONT_MATTER};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub heading_chunks: u64,
    pub mcq_chunks: u64,
    pub paragraphs_split: u64,
    pub segmentation_fallbacks: u64,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub chunks: Vec<TextChunk>,
    pub sections: BTreeMap<String, Vec<String>>,
    pub mcq_index: BTreeMap<String, Vec<McqRecord>>,
    pub stats: BuildStats,
}

/// Running state carried from page to page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ScanContext {
    current_chapter: Option<String>,
    current_section: Option<String>,
    next_position: usize,
}

impl ScanContext {
    fn map_key(&self) -> String {
        self.current_chapter
            .clone()
            .unwrap_or_else(|| FRONT_MATTER.to_string())
    }

    fn take_position(&mut self) -> usize {
        let position = self.next_position;
        self.next_position += 1;
        position
    }
}

/// Second pass: turns pages into ordered chunks using the chapter boundaries
/// from the outline scan.
pub struct ChunkBuilder<'a> {
    config: ChunkingConfig,
    segmenter: &'a dyn SentenceSegmenter,
}

impl<'a> ChunkBuilder<'a> {
    pub fn new(config: ChunkingConfig, segmenter: &'a dyn SentenceSegmenter) -> Self {
        Self { config, segmenter }
    }

    pub fn build(&self, pages: &[Page], chapters: &[ChapterBoundary]) -> BuildOutput {
        let mut out = BuildOutput::default();

        let ctx = pages.iter().fold(ScanContext::default(), |ctx, page| {
            let on_page: Vec<&ChapterBoundary> = chapters
                .iter()
                .filter(|c| c.page_num == page.page_num)
                .collect();
            self.process_page(page, &on_page, ctx, &mut out)
        });

        debug!(
            "Built {} chunks ({} positions issued)",
            out.chunks.len(),
            ctx.next_position
        );

        out
    }

    fn process_page(
        &self,
        page: &Page,
        on_page: &[&ChapterBoundary],
        mut ctx: ScanContext,
        out: &mut BuildOutput,
    ) -> ScanContext {
        if let Some(first) = on_page.first() {
            ctx.current_chapter = Some(first.label());
        }
        let mut next_boundary = 1;

        for paragraph in split_paragraphs(&page.text) {
            // A later heading on the same page moves the chapter forward.
            if next_boundary < on_page.len() {
                for found in detect_chapters(paragraph, page.page_num) {
                    if next_boundary < on_page.len() && found == *on_page[next_boundary] {
                        ctx.current_chapter = Some(found.label());
                        next_boundary += 1;
                    }
                }
            }

            match classify(paragraph) {
                ParagraphKind::Mcq(record) => {
                    out.mcq_index
                        .entry(ctx.map_key())
                        .or_default()
                        .push(record.clone());
                    let chunk = self.chunk(
                        page,
                        &mut ctx,
                        paragraph,
                        ChunkType::Mcq,
                        None,
                        None,
                        Some(record),
                    );
                    out.chunks.push(chunk);
                    out.stats.mcq_chunks += 1;
                }
                ParagraphKind::Heading => {
                    ctx.current_section = Some(paragraph.to_string());
                    out.sections
                        .entry(ctx.map_key())
                        .or_default()
                        .push(paragraph.to_string());
                    let chunk = self.chunk(
                        page,
                        &mut ctx,
                        paragraph,
                        ChunkType::Heading,
                        None,
                        Some(HEADING_IMPORTANCE),
                        None,
                    );
                    out.chunks.push(chunk);
                    out.stats.heading_chunks += 1;
                }
                ParagraphKind::Text => self.emit_text(page, &mut ctx, paragraph, out),
            }
        }

        if let Some(last) = on_page.last() {
            ctx.current_chapter = Some(last.label());
        }

        ctx
    }

    fn emit_text(
        &self,
        page: &Page,
        ctx: &mut ScanContext,
        paragraph: &str,
        out: &mut BuildOutput,
    ) {
        if paragraph.chars().count() <= self.config.long_paragraph_threshold {
            let chunk = self.chunk(
                page,
                ctx,
                paragraph,
                ChunkType::Text,
                None,
                Some(TEXT_IMPORTANCE),
                None,
            );
            out.chunks.push(chunk);
            return;
        }

        let outcome = split_with_outcome(paragraph, self.config.max_chunk_size, self.segmenter);
        out.stats.paragraphs_split += 1;
        if outcome.used_fallback {
            out.stats.segmentation_fallbacks += 1;
        }

        let total = outcome.fragments.len();
        debug!(
            "Page {}: long paragraph split into {} fragments",
            page.page_num, total
        );

        for (i, fragment) in outcome.fragments.iter().enumerate() {
            let subsection = (total > 1).then(|| format!("Part {}/{}", i + 1, total));
            let chunk = self.chunk(
                page,
                ctx,
                fragment,
                ChunkType::Text,
                subsection,
                Some(TEXT_IMPORTANCE),
                None,
            );
            out.chunks.push(chunk);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn chunk(
        &self,
        page: &Page,
        ctx: &mut ScanContext,
        text: &str,
        chunk_type: ChunkType,
        subsection: Option<String>,
        importance_score: Option<f32>,
        mcq: Option<McqRecord>,
    ) -> TextChunk {
        TextChunk {
            text: text.to_string(),
            page_num: page.page_num,
            chapter: ctx.current_chapter.clone(),
            section: ctx.current_section.clone(),
            subsection,
            position: ctx.take_position(),
            chunk_type,
            importance_score,
            mcq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutlineConfig;
    use crate::document::UnicodeSentenceSegmenter;
    use crate::outline::OutlineScanner;

    fn build(pages: &[Page], config: ChunkingConfig) -> BuildOutput {
        let chapters = OutlineScanner::new(OutlineConfig::default()).scan(pages).chapters;
        ChunkBuilder::new(config, &UnicodeSentenceSegmenter).build(pages, &chapters)
    }

    #[test]
    fn test_heading_then_text() {
        let pages = vec![Page::new(1, "CHAPTER 1 Introduction\n\nThis is a short paragraph.")];
        let out = build(&pages, ChunkingConfig::default());

        assert_eq!(out.chunks.len(), 2);
        assert_eq!(out.chunks[0].chunk_type, ChunkType::Heading);
        assert_eq!(out.chunks[0].importance_score, Some(0.9));
        assert_eq!(out.chunks[1].text, "This is a short paragraph.");
        assert_eq!(out.chunks[1].position, 1);
        assert_eq!(out.chunks[1].section.as_deref(), Some("CHAPTER 1 Introduction"));
        assert_eq!(out.chunks[1].chapter.as_deref(), Some("Chapter 1: Introduction"));
        assert_eq!(
            out.sections["Chapter 1: Introduction"],
            vec!["CHAPTER 1 Introduction".to_string()]
        );
    }

    #[test]
    fn test_chapter_carries_across_pages() {
        let pages = vec![
            Page::new(1, "Chapter 1 Cells\n\ncells are small."),
            Page::new(2, "still about cells."),
            Page::new(3, "Chapter 2 Blood\n\nblood is red."),
        ];
        let out = build(&pages, ChunkingConfig::default());

        let chapter_of = |text: &str| {
            out.chunks
                .iter()
                .find(|c| c.text == text)
                .and_then(|c| c.chapter.clone())
        };
        assert_eq!(chapter_of("still about cells.").as_deref(), Some("Chapter 1: Cells"));
        assert_eq!(chapter_of("blood is red.").as_deref(), Some("Chapter 2: Blood"));
    }

    #[test]
    fn test_second_chapter_on_same_page_advances_midway() {
        let pages = vec![Page::new(
            4,
            "Chapter 1 Cells\n\nend of cells.\n\nChapter 2 Blood\n\nstart of blood.",
        )];
        let out = build(&pages, ChunkingConfig::default());

        let chapters: Vec<_> = out.chunks.iter().map(|c| c.chapter.clone().unwrap()).collect();
        assert_eq!(
            chapters,
            vec![
                "Chapter 1: Cells",
                "Chapter 1: Cells",
                "Chapter 2: Blood",
                "Chapter 2: Blood",
            ]
        );
    }

    #[test]
    fn test_content_before_first_chapter_is_front_matter() {
        let pages = vec![
            Page::new(1, "Preface\n\nwritten for students."),
            Page::new(2, "Chapter 1 Cells"),
        ];
        let out = build(&pages, ChunkingConfig::default());

        assert_eq!(out.chunks[0].chapter, None);
        assert_eq!(out.sections[FRONT_MATTER], vec!["Preface".to_string()]);
    }

    #[test]
    fn test_mcq_is_indexed_under_current_chapter() {
        let pages = vec![Page::new(
            1,
            "Chapter 1 Cells\n\n1. Which organelle makes ATP?\nA. Nucleus\nB. Mitochondrion\nC. Ribosome\nD. Vacuole\nAnswer: B",
        )];
        let out = build(&pages, ChunkingConfig::default());

        let mcq = &out.chunks[1];
        assert_eq!(mcq.chunk_type, ChunkType::Mcq);
        assert_eq!(mcq.importance_score, None);
        assert_eq!(mcq.mcq.as_ref().and_then(|m| m.answer.as_deref()), Some("B"));
        assert_eq!(out.mcq_index["Chapter 1: Cells"].len(), 1);
        assert_eq!(out.stats.mcq_chunks, 1);
    }

    #[test]
    fn test_mcq_page_after_chapter_page_keeps_chapter() {
        let pages = vec![
            Page::new(1, "Chapter 1 Cells\n\nCells are small."),
            Page::new(
                2,
                "1. Which organelle makes ATP?\nA. Nucleus\nB. Mitochondrion\nC. Ribosome\nD. Vacuole\nAnswer: B\n\n\
                 2. Which stores DNA?\nA. Nucleus\nB. Lysosome\nC. Golgi\nD. Vacuole\n\n\
                 Steps to follow:\n1. Wash the slide\n2. Add the stain",
            ),
        ];
        let out = build(&pages, ChunkingConfig::default());

        assert_eq!(out.mcq_index.keys().collect::<Vec<_>>(), vec!["Chapter 1: Cells"]);
        assert_eq!(out.mcq_index["Chapter 1: Cells"].len(), 2);
        for chunk in out.chunks.iter().filter(|c| c.page_num == 2) {
            assert_eq!(chunk.chapter.as_deref(), Some("Chapter 1: Cells"));
        }
    }

    #[test]
    fn test_long_paragraph_fragments_share_page_and_context() {
        let sentence = "the membrane controls what enters and leaves the cell. ";
        let long = sentence.repeat(10);
        let pages = vec![Page::new(7, format!("Chapter 3 Membranes\n\n{}", long.trim()))];
        let config = ChunkingConfig {
            max_chunk_size: 120,
            long_paragraph_threshold: 200,
        };
        let out = build(&pages, config);

        let fragments: Vec<&TextChunk> = out
            .chunks
            .iter()
            .filter(|c| c.subsection.is_some())
            .collect();
        let total = fragments.len();
        assert!(total > 1);
        for (i, fragment) in fragments.iter().enumerate() {
            assert_eq!(fragment.page_num, 7);
            assert!(fragment.text.chars().count() <= 120);
            assert_eq!(fragment.chapter.as_deref(), Some("Chapter 3: Membranes"));
            assert_eq!(fragment.subsection, Some(format!("Part {}/{}", i + 1, total)));
        }
        let joined = fragments
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(joined, long.trim());
        assert_eq!(out.stats.paragraphs_split, 1);
    }

    #[test]
    fn test_positions_are_contiguous() {
        let pages = vec![
            Page::new(1, "INTRO\n\none.\n\ntwo."),
            Page::new(2, ""),
            Page::new(3, "three.\n\nFOUR"),
        ];
        let out = build(&pages, ChunkingConfig::default());

        let positions: Vec<usize> = out.chunks.iter().map(|c| c.position).collect();
        assert_eq!(positions, (0..5).collect::<Vec<_>>());
    }
}
