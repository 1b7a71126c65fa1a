use thiserror::Error;

/// The custom error type for the application.
///
/// Repository lookups report "not found" as `Option::None`, never as an
/// error; services are responsible for turning absence into `NotFound`
/// (or `Forbidden`, where the operation treats a missing membership as an
/// authorization failure). Store I/O failures surface as `Sqlx`/`Internal`
/// with the cause attached, and are never exposed verbatim to callers.
#[derive(Debug, Error)]
pub enum Error {
    /// An error originating from the sqlx library.
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// A validation error (malformed identifier, invalid role/status
    /// literal, invalid field value).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A not found error (resource does not exist).
    #[error("Not found: {0}")]
    NotFound(String),

    /// A forbidden error (caller's role or membership is insufficient).
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// A conflict error (duplicate resource, already-responded invitation).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// An internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// A type alias for `Result<T, Error>` to simplify function signatures.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable machine-readable code for each error kind, so callers can
    /// render messages without inspecting internal diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::Conflict(_) => "CONFLICT",
            Error::Sqlx(_) | Error::Internal(_) => "INTERNAL_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }
}
