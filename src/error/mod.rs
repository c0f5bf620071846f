//! Error types

mod api;
mod config;
mod field;

pub use api::*;
pub use config::*;
pub use field::*;

/// Top-level error type for all client operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error during an API call.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Invalid client or request configuration, caught before any network call.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Field access error on a record.
    #[error(transparent)]
    Field(#[from] FieldError),

    /// The operation was cancelled via its cancellation token.
    #[error("Operation cancelled")]
    Cancelled,
}
