use serde::{Deserialize, Serialize};

use crate::utils::error::EngineError;

/// A page of already-extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number in reading order. Gaps are allowed.
    pub page_num: u32,
    pub text: String,
}

impl Page {
    pub fn new(page_num: u32, text: impl Into<String>) -> Self {
        Self {
            page_num,
            text: text.into(),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.page_num == 0 {
            return Err(EngineError::InvalidPage(
                "page numbers start at 1".to_string(),
            ));
        }
        Ok(())
    }
}
