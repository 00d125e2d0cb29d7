use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const OPTION_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// A multiple-choice question block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqRecord {
    pub question_num: String,
    pub question: String,
    /// Keyed by option letter `A`..`D`.
    pub options: BTreeMap<String, String>,
    pub answer: Option<String>,
}

impl McqRecord {
    pub fn option(&self, letter: &str) -> Option<&str> {
        self.options.get(letter).map(String::as_str)
    }
}

// Capture groups shared by every template:
// 1 = item number, 2 = stem, 3..=6 = options A..D, 7 = answer letter (optional).
static MCQ_TEMPLATES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // 1. Stem\nA. ...\nB) ...\nC. ...\nD. ...\nAnswer: B
        r"(?is)^\s*(?:Q(?:uestion)?\s*)?(\d+)\s*[.):]\s*(.+?)\s*\n\s*A[.)]\s*(.+?)\s*\n\s*B[.)]\s*(.+?)\s*\n\s*C[.)]\s*(.+?)\s*\n\s*D[.)]\s*(.+?)(?:\s*\n\s*Ans(?:wer)?\s*[:\-]\s*\(?([A-D])\b[^\n]*)?\s*$",
        // 1. Stem\n(A) ...\n(B) ...\n(C) ...\n(D) ...
        r"(?is)^\s*(?:Q(?:uestion)?\s*)?(\d+)\s*[.):]\s*(.+?)\s*\n\s*\(A\)\s*(.+?)\s*\n\s*\(B\)\s*(.+?)\s*\n\s*\(C\)\s*(.+?)\s*\n\s*\(D\)\s*(.+?)(?:\s*\n\s*Ans(?:wer)?\s*[:\-]\s*\(?([A-D])\b[^\n]*)?\s*$",
        // 1. Stem (A) ... (B) ... (C) ... (D) ...   options inline
        r"(?is)^\s*(?:Q(?:uestion)?\s*)?(\d+)\s*[.):]\s*(.+?)\s+\(?A[.)]\s*(.+?)\s+\(?B[.)]\s*(.+?)\s+\(?C[.)]\s*(.+?)\s+\(?D[.)]\s*(.+?)(?:\s+Ans(?:wer)?\s*[:\-]\s*\(?([A-D])\b[^\n]*)?\s*$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("MCQ template is valid"))
    .collect()
});

/// Try every template in order; the first full match wins.
pub fn detect_mcq(paragraph: &str) -> Option<McqRecord> {
    MCQ_TEMPLATES
        .iter()
        .find_map(|template| template.captures(paragraph))
        .map(|caps| record_from_captures(&caps))
}

fn record_from_captures(caps: &Captures<'_>) -> McqRecord {
    let group = |i: usize| caps.get(i).map(|m| collapse(m.as_str())).unwrap_or_default();

    let options = OPTION_LETTERS
        .iter()
        .enumerate()
        .map(|(i, letter)| (letter.to_string(), group(i + 3)))
        .collect();

    McqRecord {
        question_num: group(1),
        question: group(2),
        options,
        answer: caps.get(7).map(|m| m.as_str().to_uppercase()),
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_options_with_answer() {
        let block = "12. Which organ pumps blood?\nA. Liver\nB. Heart\nC. Lung\nD. Kidney\nAnswer: B";
        let mcq = detect_mcq(block).expect("should match");

        assert_eq!(mcq.question_num, "12");
        assert_eq!(mcq.question, "Which organ pumps blood?");
        assert_eq!(mcq.option("A"), Some("Liver"));
        assert_eq!(mcq.option("B"), Some("Heart"));
        assert_eq!(mcq.option("C"), Some("Lung"));
        assert_eq!(mcq.option("D"), Some("Kidney"));
        assert_eq!(mcq.answer.as_deref(), Some("B"));
    }

    #[test]
    fn test_parenthesised_options_without_answer() {
        let block = "3) What is the normal body temperature?\n(A) 35 C\n(B) 37 C\n(C) 39 C\n(D) 41 C";
        let mcq = detect_mcq(block).expect("should match");

        assert_eq!(mcq.question_num, "3");
        assert_eq!(mcq.option("B"), Some("37 C"));
        assert_eq!(mcq.option("D"), Some("41 C"));
        assert_eq!(mcq.answer, None);
    }

    #[test]
    fn test_right_paren_markers_and_lowercase() {
        let block = "7. pick one\na) red\nb) green\nc) blue\nd) black\nanswer: c";
        let mcq = detect_mcq(block).expect("case-insensitive match");

        assert_eq!(mcq.option("C"), Some("blue"));
        assert_eq!(mcq.answer.as_deref(), Some("C"));
    }

    #[test]
    fn test_inline_options() {
        let block = "5. The capital of France is (A) Rome (B) Paris (C) Madrid (D) Berlin Answer: (B)";
        let mcq = detect_mcq(block).expect("inline template");

        assert_eq!(mcq.question, "The capital of France is");
        assert_eq!(mcq.option("A"), Some("Rome"));
        assert_eq!(mcq.option("D"), Some("Berlin"));
        assert_eq!(mcq.answer.as_deref(), Some("B"));
    }

    #[test]
    fn test_multiline_stem_is_collapsed() {
        let block = "4. Which of the following\nis a vitamin?\nA. Iron\nB. Zinc\nC. Retinol\nD. Sodium";
        let mcq = detect_mcq(block).expect("should match");

        assert_eq!(mcq.question, "Which of the following is a vitamin?");
        assert_eq!(mcq.option("C"), Some("Retinol"));
    }

    #[test]
    fn test_missing_option_d_is_not_mcq() {
        let block = "1. Which organ pumps blood?\nA. Liver\nB. Heart\nC. Lung";
        assert!(detect_mcq(block).is_none());
    }

    #[test]
    fn test_missing_item_number_is_not_mcq() {
        let block = "Which organ pumps blood?\nA. Liver\nB. Heart\nC. Lung\nD. Kidney";
        assert!(detect_mcq(block).is_none());
    }
}
