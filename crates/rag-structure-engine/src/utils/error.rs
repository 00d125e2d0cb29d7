use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    #[error("Segmentation error: {0}")]
    SegmentationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
