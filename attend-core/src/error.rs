use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gazetteer error: {0}")]
    Gazetteer(#[from] serde_json::Error),

    #[error("Other error: {0}")]
    Other(String),
}

/// Errors surfaced by a translation call.
///
/// Every variant is caused by the input or the degraded extractor and is
/// reported to callers as a client error.
///
/// Date parse failures never appear here: the resolver falls back to today.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("Entity extractor unavailable: {0}")]
    ExtractorUnavailable(String),

    #[error("Entity extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Could not normalize time phrase '{phrase}': {reason}")]
    TimeNormalizationFailed { phrase: String, reason: String },
}
