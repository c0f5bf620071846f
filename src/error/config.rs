//! Configuration error types

/// Errors from invalid client or request configuration.
///
/// These are raised before any network call is made.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// The configured API root is not a valid absolute HTTP(S) URL.
    #[error("Invalid API root '{root}': {message}")]
    InvalidRoot {
        /// The offending root URL.
        root: String,
        /// Why it was rejected.
        message: String,
    },

    /// The requested page limit is outside the server's accepted range.
    #[error("Page limit {limit} out of range (1..=100)")]
    LimitOutOfRange { limit: u32 },

    /// The progress resolution is outside `(0.0, 1.0]`.
    #[error("Progress resolution {resolution} out of range (0.0, 1.0]")]
    InvalidResolution { resolution: f64 },

    /// Mutually exclusive constraints were declared on the same key.
    #[error("Conflicting constraints on key '{key}': is_empty and is_not_empty are mutually exclusive")]
    ConflictingConstraints { key: String },
}
