use once_cell::sync::Lazy;
use regex::Regex;

/// One or more blank (possibly whitespace-only) lines.
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"));

/// Split page text into trimmed paragraph candidates.
///
/// A single newline never splits; empty candidates are dropped.
pub fn split_paragraphs(page_text: &str) -> Vec<&str> {
    BLANK_LINES
        .split(page_text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}
