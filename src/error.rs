//! Unified error types for the tips service.

use thiserror::Error;

/// Unified error type for the tips service.
#[derive(Error, Debug)]
pub enum TipsError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but could not be turned into pipeline settings.
    #[error("invalid settings: {0}")]
    Settings(#[from] ConfigError),

    /// Upstream feed error.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),
}

/// Errors raised by the odds and football feeds.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The provider answered with a non-success status.
    #[error("failed to fetch {feed}: {reason}")]
    FetchFailed {
        /// Which feed failed ("odds", "fixtures", "standings").
        feed: &'static str,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to parse the provider response.
    #[error("failed to parse feed data: {0}")]
    ParseError(String),

    /// HTTP request failed. Built without the request URL, which may carry
    /// credentials.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Errors turning raw configuration into pipeline settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A bucket definition could not be parsed or is inconsistent.
    #[error("invalid bucket definition: {0}")]
    InvalidBucket(String),

    /// Unknown IANA timezone name.
    #[error("unknown timezone: {0}")]
    InvalidTimezone(String),

    /// Any other invalid value.
    #[error("{0}")]
    Invalid(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, TipsError>;
