use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::mcq::{McqRecord, OPTION_LETTERS};

pub const HEADING_IMPORTANCE: f32 = 0.9;
pub const TEXT_IMPORTANCE: f32 = 0.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Text,
    Heading,
    Mcq,
}

impl ChunkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Heading => "heading",
            Self::Mcq => "mcq",
        }
    }
}

/// One emitted chunk. `position` is the document-wide ordering key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    pub page_num: u32,
    pub chapter: Option<String>,
    pub section: Option<String>,
    /// `Part i/n`, only on fragments of a split paragraph.
    pub subsection: Option<String>,
    pub position: usize,
    pub chunk_type: ChunkType,
    /// 0.9 for headings, 0.0 for text, unset for MCQs.
    pub importance_score: Option<f32>,
    pub mcq: Option<McqRecord>,
}

impl TextChunk {
    /// Storage identity: SHA-256 of the text, hex encoded.
    ///
    /// Identical text yields the same id regardless of `position`.
    pub fn content_id(&self) -> String {
        format!("{:x}", Sha256::digest(self.text.as_bytes()))
    }

    /// Flatten into primitive metadata values. Absent optional fields become `""`.
    pub fn to_metadata(&self) -> ChunkMetadata {
        let mut meta = ChunkMetadata::new();

        meta.insert("text".into(), MetadataValue::Str(self.text.clone()));
        meta.insert("page_num".into(), MetadataValue::Int(i64::from(self.page_num)));
        meta.insert("chapter".into(), opt_str(self.chapter.as_deref()));
        meta.insert("section".into(), opt_str(self.section.as_deref()));
        meta.insert("subsection".into(), opt_str(self.subsection.as_deref()));
        meta.insert("position".into(), MetadataValue::Int(self.position as i64));
        meta.insert(
            "chunk_type".into(),
            MetadataValue::Str(self.chunk_type.as_str().to_string()),
        );
        meta.insert(
            "importance_score".into(),
            self.importance_score
                .map(|score| MetadataValue::Float(f64::from(score)))
                .unwrap_or_else(|| MetadataValue::Str(String::new())),
        );
        meta.insert("content_id".into(), MetadataValue::Str(self.content_id()));

        let mcq = self.mcq.as_ref();
        meta.insert(
            "mcq_question_num".into(),
            opt_str(mcq.map(|m| m.question_num.as_str())),
        );
        meta.insert("mcq_question".into(), opt_str(mcq.map(|m| m.question.as_str())));
        for letter in OPTION_LETTERS {
            meta.insert(
                format!("mcq_option_{}", letter.to_lowercase()),
                opt_str(mcq.and_then(|m| m.option(letter))),
            );
        }
        meta.insert(
            "mcq_answer".into(),
            opt_str(mcq.and_then(|m| m.answer.as_deref())),
        );

        meta
    }
}

fn opt_str(value: Option<&str>) -> MetadataValue {
    MetadataValue::Str(value.unwrap_or_default().to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl MetadataValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

pub type ChunkMetadata = BTreeMap<String, MetadataValue>;
