use serde::{Deserialize, Serialize};
use std::fmt;

/// Single structured error shape shared by the pipeline crates and the CLI.
///
/// `code` is a stable SCREAMING_SNAKE identifier whose prefix selects the
/// [`ErrorCategory`]; `details` carries the low-level cause (paths, statuses).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Missing credentials, invalid settings, dimension mismatches.
    Configuration,
    /// Unreadable or malformed corpus/chunk files.
    Corpus,
    /// Vector index storage and discovery.
    Index,
    /// Embedding backend calls.
    Embedding,
    /// Language-model backend calls.
    Generation,
    Internal,
}

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn category(&self) -> ErrorCategory {
        let prefix = self.code.split('_').next().unwrap_or("");
        match prefix {
            "CONFIG" => ErrorCategory::Configuration,
            "CORPUS" => ErrorCategory::Corpus,
            "INDEX" => ErrorCategory::Index,
            "EMBED" => ErrorCategory::Embedding,
            "LLM" => ErrorCategory::Generation,
            _ => ErrorCategory::Internal,
        }
    }

    /// Message plus details, for surfaces that show a single line to a person.
    pub fn describe(&self) -> String {
        match self.details.as_deref() {
            Some(d) if !d.is_empty() => format!("{} ({d})", self.message),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_follows_code_prefix() {
        assert_eq!(
            AppError::new("CONFIG_INVALID", "bad").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            AppError::new("LLM_REQUEST_FAILED", "x").category(),
            ErrorCategory::Generation
        );
        assert_eq!(
            AppError::new("EMBED_FAILED", "x").category(),
            ErrorCategory::Embedding
        );
        assert_eq!(AppError::new("WHATEVER", "x").category(), ErrorCategory::Internal);
    }

    #[test]
    fn describe_includes_details_when_present() {
        let err = AppError::new("INDEX_OPEN_FAILED", "Failed to open index")
            .with_details("path=/tmp/x")
            .with_retryable(true);
        assert_eq!(err.describe(), "Failed to open index (path=/tmp/x)");
        assert!(err.retryable);
        assert_eq!(err.to_string(), "[INDEX_OPEN_FAILED] Failed to open index");
    }
}
