use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::document::McqRecord;
use crate::utils::error::EngineError;

/// Map key for headings and MCQs seen before the first chapter boundary.
pub const FRONT_MATTER: &str = "Front Matter";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterBoundary {
    /// Captured token as written: `3`, `IV`, `xii`.
    pub number: String,
    pub title: String,
    pub page_num: u32,
}

impl ChapterBoundary {
    pub fn new(number: impl Into<String>, title: impl Into<String>, page_num: u32) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            page_num,
        }
    }

    /// Display label, also the key into `sections` and `mcq_index`.
    pub fn label(&self) -> String {
        format!("Chapter {}: {}", self.number, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineMetadata {
    /// Number of valid pages that were scanned.
    pub total_pages: usize,
    pub extracted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub chapters: Vec<ChapterBoundary>,
    pub sections: BTreeMap<String, Vec<String>>,
    pub mcq_index: BTreeMap<String, Vec<McqRecord>>,
    pub metadata: OutlineMetadata,
}

impl Outline {
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            chapters: Vec::new(),
            sections: BTreeMap::new(),
            mcq_index: BTreeMap::new(),
            metadata: OutlineMetadata {
                total_pages: 0,
                extracted_at: Utc::now(),
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty()
            && self.chapters.is_empty()
            && self.sections.is_empty()
            && self.mcq_index.is_empty()
    }

    /// Labels in discovery order. Repeated headings repeat here too.
    pub fn chapter_labels(&self) -> Vec<String> {
        self.chapters.iter().map(ChapterBoundary::label).collect()
    }

    pub fn sections_for(&self, label: &str) -> &[String] {
        self.sections.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn mcqs_for(&self, label: &str) -> &[McqRecord] {
        self.mcq_index.get(label).map(Vec::as_slice).unwrap_or_default()
    }

    /// Closest boundary at or before `page`. Among boundaries on the same
    /// page the last one wins.
    pub fn chapter_for_page(&self, page: u32) -> Option<&ChapterBoundary> {
        self.chapters
            .iter()
            .filter(|c| c.page_num <= page)
            .max_by_key(|c| c.page_num)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}
