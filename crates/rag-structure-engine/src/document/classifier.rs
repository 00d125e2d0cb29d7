use once_cell::sync::Lazy;
use regex::Regex;

use super::mcq::{detect_mcq, McqRecord};

const MAX_HEADING_CHARS: usize = 100;
const MAX_TITLE_CASE_WORDS: usize = 6;

/// Lowercase words allowed inside a Title-Case heading ("Diseases of the Heart").
const MINOR_WORDS: [&str; 14] = [
    "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
];

/// `1 Title`, `1. Title`, `1.2.3 Title`
static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(?:\.\d+)*\.?\s+\S").expect("numbered heading pattern is valid")
});

#[derive(Debug, Clone, PartialEq)]
pub enum ParagraphKind {
    Mcq(McqRecord),
    Heading,
    Text,
}

impl ParagraphKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mcq(_) => "mcq",
            Self::Heading => "heading",
            Self::Text => "text",
        }
    }
}

/// Classify one trimmed paragraph: MCQ first, then heading, else text.
pub fn classify(paragraph: &str) -> ParagraphKind {
    if let Some(record) = detect_mcq(paragraph) {
        return ParagraphKind::Mcq(record);
    }

    if is_heading(paragraph) {
        return ParagraphKind::Heading;
    }

    ParagraphKind::Text
}

pub fn is_heading(paragraph: &str) -> bool {
    let text = paragraph.trim();
    if text.is_empty() || text.chars().count() >= MAX_HEADING_CHARS || text.ends_with('.') {
        return false;
    }

    is_all_uppercase(text) || NUMBERED_HEADING.is_match(text) || is_title_case_phrase(text)
}

fn is_all_uppercase(text: &str) -> bool {
    text.chars().any(char::is_alphabetic) && !text.chars().any(char::is_lowercase)
}

fn is_title_case_phrase(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_TITLE_CASE_WORDS {
        return false;
    }

    words.iter().enumerate().all(|(i, word)| {
        let core = word.trim_start_matches(|c: char| !c.is_alphanumeric());
        let Some(first) = core.chars().next() else {
            // Pure punctuation such as "&" or "-".
            return i > 0;
        };

        if i == 0 {
            first.is_uppercase()
        } else {
            first.is_uppercase()
                || first.is_ascii_digit()
                || MINOR_WORDS.contains(&core.trim_end_matches(|c: char| !c.is_alphanumeric()))
        }
    })
}
