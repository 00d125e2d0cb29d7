use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::error::EngineError;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub chunking: ChunkingConfig,
    pub outline: OutlineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Upper bound, in characters, for fragments of a split paragraph.
    pub max_chunk_size: usize,
    /// Text paragraphs longer than this (characters) go through the splitter.
    pub long_paragraph_threshold: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            long_paragraph_threshold: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutlineConfig {
    /// Title lines are only looked for on pages numbered up to this value.
    pub title_page_limit: u32,
    pub min_title_len: usize,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            title_page_limit: 3,
            min_title_len: 6,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Directory for the rotating log file; stdout only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,rag_structure_engine=debug".to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty, // development
    Json,   // production
}

impl Settings {
    /// Load `config/settings.*` (optional) overlaid with `APP_*` variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config/settings"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        // Load from environment first
        dotenvy::dotenv().ok();

        let config = Config::builder()
            .add_source(File::from(path).required(false))
            // Override with environment variables (prefix: APP)
            // Example: APP_CHUNKING__MAX_CHUNK_SIZE=800
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;

        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.chunking.max_chunk_size == 0 {
            return Err(EngineError::ConfigError(
                "chunking.max_chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.chunking.long_paragraph_threshold == 0 {
            return Err(EngineError::ConfigError(
                "chunking.long_paragraph_threshold must be greater than zero".to_string(),
            ));
        }

        if self.outline.min_title_len == 0 {
            return Err(EngineError::ConfigError(
                "outline.min_title_len must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.chunking.max_chunk_size, 1000);
        assert_eq!(settings.chunking.long_paragraph_threshold, 1000);
        assert_eq!(settings.outline.title_page_limit, 3);
        assert_eq!(settings.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut settings = Settings::default();
        settings.chunking.max_chunk_size = 0;

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("max_chunk_size"));
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[chunking]\nmax_chunk_size = 800\n\n[logging]\nformat = \"json\""
        )
        .unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.chunking.max_chunk_size, 800);
        // Unset keys fall back to defaults.
        assert_eq!(settings.chunking.long_paragraph_threshold, 1000);
        assert_eq!(settings.outline.min_title_len, 6);
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_override_uses_single_underscore_after_prefix() {
        // 800 matches the toml test, so a parallel run sees the same value.
        std::env::set_var("APP_CHUNKING__MAX_CHUNK_SIZE", "800");
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent"));
        std::env::remove_var("APP_CHUNKING__MAX_CHUNK_SIZE");

        assert_eq!(settings.unwrap().chunking.max_chunk_size, 800);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent")).unwrap();

        assert_eq!(settings.outline, OutlineConfig::default());
    }
}
