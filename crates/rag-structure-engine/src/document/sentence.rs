use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::utils::error::EngineError;

/// Clause boundary: punctuation followed by whitespace. The punctuation stays
/// with the piece before it.
static CLAUSE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.,:;?!]\s+").expect("clause break pattern is valid"));

/// Sentence boundary detection used by the size-bounded splitter.
///
/// Sentences come back trimmed and are rejoined with one space, so a
/// boundary with no whitespace after it in the input must not be split.
#[cfg_attr(test, mockall::automock)]
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, text: &str) -> Result<Vec<String>, EngineError>;
}

/// UAX #29 sentence boundaries, kept only where whitespace follows
/// (`Stop!Then` stays one sentence).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeSentenceSegmenter;

impl SentenceSegmenter for UnicodeSentenceSegmenter {
    fn segment(&self, text: &str) -> Result<Vec<String>, EngineError> {
        let mut sentences = Vec::new();
        let mut current = String::new();

        for raw in text.unicode_sentences() {
            current.push_str(raw);
            if raw.ends_with(char::is_whitespace) {
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                current.clear();
            }
        }

        let tail = current.trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }

        if sentences.is_empty() && !text.trim().is_empty() {
            return Err(EngineError::SegmentationError(
                "no sentence boundaries found".to_string(),
            ));
        }

        Ok(sentences)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SplitOutcome {
    pub fragments: Vec<String>,
    pub used_fallback: bool,
}

/// Split `text` into fragments of at most `max_chunk_size` characters.
///
/// Sentences are packed greedily; an oversized sentence is broken at clause
/// punctuation and then at whitespace. A single token longer than the bound is
/// emitted unchanged. Never fails: if sentence segmentation fails the text is
/// cut into fixed-width windows instead.
pub fn split_long_paragraph(text: &str, max_chunk_size: usize) -> Vec<String> {
    split_long_paragraph_with(text, max_chunk_size, &UnicodeSentenceSegmenter)
}

pub fn split_long_paragraph_with(
    text: &str,
    max_chunk_size: usize,
    segmenter: &dyn SentenceSegmenter,
) -> Vec<String> {
    split_with_outcome(text, max_chunk_size, segmenter).fragments
}

pub(crate) fn split_with_outcome(
    text: &str,
    max_chunk_size: usize,
    segmenter: &dyn SentenceSegmenter,
) -> SplitOutcome {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return SplitOutcome::default();
    }

    let max = max_chunk_size.max(1);

    let sentences = match segmenter.segment(&normalized) {
        Ok(sentences) if !sentences.is_empty() => sentences,
        Ok(_) => {
            warn!("Sentence segmenter returned nothing, using fixed-width windows");
            return fixed_width_outcome(&normalized, max);
        }
        Err(e) => {
            warn!("Sentence segmentation failed: {}, using fixed-width windows", e);
            return fixed_width_outcome(&normalized, max);
        }
    };

    let mut acc = Accumulator::new(max);

    for sentence in &sentences {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if char_len(sentence) <= max {
            acc.push(sentence);
            continue;
        }

        acc.flush();
        for clause in split_clauses(sentence) {
            if char_len(clause) <= max {
                acc.push(clause);
            } else {
                for word in clause.split_whitespace() {
                    acc.push(word);
                }
            }
        }
    }

    let fragments = acc.finish();
    debug!(
        "Split {} chars into {} fragments (max {})",
        char_len(&normalized),
        fragments.len(),
        max
    );

    SplitOutcome {
        fragments,
        used_fallback: false,
    }
}

fn fixed_width_outcome(text: &str, max: usize) -> SplitOutcome {
    let chars: Vec<char> = text.chars().collect();
    let mut fragments: Vec<String> = chars
        .chunks(max)
        .map(|window| window.iter().collect::<String>().trim().to_string())
        .filter(|w| !w.is_empty())
        .collect();

    if fragments.is_empty() {
        fragments.push(text.to_string());
    }

    SplitOutcome {
        fragments,
        used_fallback: true,
    }
}

fn split_clauses(sentence: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut start = 0;

    for m in CLAUSE_BREAK.find_iter(sentence) {
        // Punctuation is a single ASCII byte.
        let end = m.start() + 1;
        let clause = sentence[start..end].trim();
        if !clause.is_empty() {
            clauses.push(clause);
        }
        start = m.end();
    }

    let tail = sentence[start..].trim();
    if !tail.is_empty() {
        clauses.push(tail);
    }

    clauses
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Greedy packer. Pieces are joined with one space and the space counts
/// toward the bound.
struct Accumulator {
    max: usize,
    current: String,
    current_len: usize,
    out: Vec<String>,
}

impl Accumulator {
    fn new(max: usize) -> Self {
        Self {
            max,
            current: String::new(),
            current_len: 0,
            out: Vec::new(),
        }
    }

    fn push(&mut self, piece: &str) {
        let len = char_len(piece);

        if !self.current.is_empty() && self.current_len + 1 + len > self.max {
            self.flush();
        }

        if self.current.is_empty() {
            self.current.push_str(piece);
            self.current_len = len;
        } else {
            self.current.push(' ');
            self.current.push_str(piece);
            self.current_len += 1 + len;
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.out.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.out
    }
}
