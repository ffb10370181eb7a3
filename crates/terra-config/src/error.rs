//! Configuration error types.

use std::path::PathBuf;

/// Errors raised while reading, writing, or validating `config.ron`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config directory or file could not be written.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid RON for [`crate::Config`].
    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    /// The config could not be rendered as RON.
    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),

    /// A value parsed but is unusable.
    #[error("invalid `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
