//! Error types for sitegen

use thiserror::Error;

/// The main error type for sitegen operations.
///
/// Provider and persistence variants display their embedded message
/// verbatim: those strings end up in job outcomes and in the manifest's
/// `error` fields, where a variant prefix would only add noise.
#[derive(Debug, Error)]
pub enum SitegenError {
    /// A required API credential is absent from the environment.
    #[error("{0} is missing.")]
    MissingCredential(&'static str),

    /// A provider request failed: bad status, invalid JSON, unexpected
    /// payload shape, terminal task failure, or polling timeout.
    #[error("{0}")]
    ProviderError(String),

    /// A generated payload could not be downloaded, decoded, or written.
    #[error("{0}")]
    PersistError(String),

    /// Pipeline-level configuration problem. Fatal, unlike the per-job
    /// errors above.
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for sitegen operations
pub type Result<T> = std::result::Result<T, SitegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_message() {
        let err = SitegenError::MissingCredential("RECRAFT_API_TOKEN");
        assert_eq!(err.to_string(), "RECRAFT_API_TOKEN is missing.");
    }

    #[test]
    fn test_provider_error_is_verbatim() {
        let err = SitegenError::ProviderError(
            "Runway task abc ended with status FAILED.".to_string(),
        );
        assert_eq!(err.to_string(), "Runway task abc ended with status FAILED.");
    }
}
