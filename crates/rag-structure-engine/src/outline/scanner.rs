use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::model::ChapterBoundary;
use crate::config::OutlineConfig;
use crate::document::Page;

// Most specific first. Each captures (number, title) on a single line.
static CHAPTER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // Chapter #3 Title
        r"(?im)^[ \t]*chapter[ \t]*#[ \t]*(\d+|[ivxlcdm]+)(?:[ \t]*[.:\-][ \t]*|[ \t]+)(\S[^\r\n]*?)[ \t\r]*$",
        // Chapter 3.Title / Chapter 3: Title / Chapter III Title
        r"(?im)^[ \t]*chapter[ \t]+(\d+|[ivxlcdm]+)(?:[ \t]*[.:\-][ \t]*|[ \t]+)(\S[^\r\n]*?)[ \t\r]*$",
        // Unit 3 Title
        r"(?im)^[ \t]*unit[ \t]+(\d+|[ivxlcdm]+)(?:[ \t]*[.:\-][ \t]*|[ \t]+)(\S[^\r\n]*?)[ \t\r]*$",
        // 3 Title / IV Title. A period after the number is a list item, not a chapter.
        r"(?m)^[ \t]*(\d{1,3}|[IVX]{1,6})[ \t]+([A-Z][^\r\n]{0,80}?)[ \t\r]*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("chapter pattern is valid"))
    .collect()
});

/// First option line of an MCQ block: `A.`, `a)` or `(A)`.
static MCQ_OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?[Aa][.)]").expect("option line pattern is valid"));

/// Title and chapter boundaries; sections and MCQs are filled in later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineSkeleton {
    pub title: String,
    pub chapters: Vec<ChapterBoundary>,
}

pub struct OutlineScanner {
    config: OutlineConfig,
}

impl OutlineScanner {
    pub fn new(config: OutlineConfig) -> Self {
        Self { config }
    }

    /// Single forward pass over every page.
    pub fn scan(&self, pages: &[Page]) -> OutlineSkeleton {
        let mut skeleton = OutlineSkeleton::default();

        for page in pages {
            if skeleton.title.is_empty() && page.page_num <= self.config.title_page_limit {
                if let Some(title) = self.detect_title(&page.text) {
                    debug!("Title on page {}: {}", page.page_num, title);
                    skeleton.title = title;
                }
            }

            let found = detect_chapters(&page.text, page.page_num);
            if !found.is_empty() {
                debug!("Page {}: {} chapter boundaries", page.page_num, found.len());
            }
            skeleton.chapters.extend(found);
        }

        info!(
            "Outline scan: {} pages, {} chapters, title {:?}",
            pages.len(),
            skeleton.chapters.len(),
            skeleton.title
        );

        skeleton
    }

    /// First line made only of ASCII capitals and spaces, long enough to be a title.
    fn detect_title(&self, text: &str) -> Option<String> {
        text.lines()
            .map(str::trim)
            .find(|line| {
                line.len() >= self.config.min_title_len
                    && line.chars().any(|c| c.is_ascii_uppercase())
                    && line.chars().all(|c| c.is_ascii_uppercase() || c == ' ')
            })
            .map(str::to_string)
    }
}

/// Chapter boundaries on one page: the first pattern with any match wins and
/// every match of that pattern is kept, in reading order. A line that opens
/// an MCQ block is a question stem and never counts.
pub fn detect_chapters(text: &str, page_num: u32) -> Vec<ChapterBoundary> {
    CHAPTER_PATTERNS
        .iter()
        .map(|pattern| {
            pattern
                .captures_iter(text)
                .filter(|caps| !opens_mcq_block(text, caps.get(0).map_or(0, |m| m.end())))
                .map(|caps| ChapterBoundary::new(caps[1].trim(), caps[2].trim(), page_num))
                .collect::<Vec<_>>()
        })
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

fn opens_mcq_block(text: &str, line_end: usize) -> bool {
    text[line_end..]
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .is_some_and(|line| MCQ_OPTION_LINE.is_match(line))
}
