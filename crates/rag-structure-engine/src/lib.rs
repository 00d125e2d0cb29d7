pub mod builder;
pub mod config;
pub mod document;
pub mod engine;
pub mod outline;
pub mod utils;

pub use config::Settings;
pub use document::{ChunkMetadata, ChunkType, McqRecord, MetadataValue, Page, TextChunk};
pub use engine::{extract_structure, StructureEngine};
pub use outline::{ChapterBoundary, Outline, OutlineMetadata};
pub use utils::error::EngineError;
