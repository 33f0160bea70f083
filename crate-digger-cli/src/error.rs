use thiserror::Error;

use crate_digger_core::ConfigError;
use crate_digger_db::{OperationError, SchemaError};
use crate_digger_discogs::{DiscogsError, MatchError};
use crate_digger_session::SessionError;
use crate_digger_spotify::SpotifyError;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Database could not be opened
    #[error("Database error: {0}")]
    Schema(#[from] SchemaError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] OperationError),

    /// Catalog client could not be built
    #[error("Catalog error: {0}")]
    Discogs(#[from] DiscogsError),

    /// The catalog could not be reached during a lookup
    #[error("The record catalog is unavailable right now, try again later")]
    CatalogUnavailable(#[from] MatchError),

    /// Streaming metadata lookup failed
    #[error("Spotify error: {0}")]
    Spotify(#[from] SpotifyError),

    /// Interactive session failed
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Bad command-line input
    #[error("{0}")]
    Usage(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    pub(crate) fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
