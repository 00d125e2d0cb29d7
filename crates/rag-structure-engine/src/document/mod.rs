pub mod chunk;
pub mod classifier;
pub mod mcq;
pub mod page;
pub mod paragraph;
pub mod sentence;

pub use chunk::{ChunkMetadata, ChunkType, MetadataValue, TextChunk};
pub use classifier::{classify, is_heading, ParagraphKind};
pub use mcq::{detect_mcq, McqRecord};
pub use page::Page;
pub use paragraph::split_paragraphs;
pub use sentence::{
    split_long_paragraph, split_long_paragraph_with, SentenceSegmenter, UnicodeSentenceSegmenter,
};
