pub mod settings;

pub use settings::{ChunkingConfig, LogFormat, LoggingConfig, OutlineConfig, Settings};
