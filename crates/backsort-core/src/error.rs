//! Error types for backsort.
//!
//! Only the ambient edges can fail: loading settings, reading frontmatter
//! from disk, opening a vault. Timestamp resolution and sorting never
//! return errors; malformed input is a decline inside the resolver chain.

use thiserror::Error;

/// Top-level result type for backsort operations.
pub type Result<T> = std::result::Result<T, BacksortError>;

/// Top-level error type for backsort.
#[derive(Debug, Error)]
pub enum BacksortError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading [`Settings`](crate::config::Settings).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in '{path}': {message}")]
    Invalid { path: String, message: String },
}
