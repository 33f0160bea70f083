/// Errors returned by the Discogs client.
#[derive(Debug, thiserror::Error)]
pub enum DiscogsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limited by Discogs API")]
    RateLimited,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Not found in Discogs: {0}")]
    NotFound(String),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DiscogsError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the catalog itself could not be reached or refused to answer,
    /// as opposed to answering with something unusable for one record.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::Malformed(_) | Self::NotFound(_))
    }
}

/// Errors surfaced by the catalog matcher.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[source] DiscogsError),
}
