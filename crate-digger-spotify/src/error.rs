/// Errors returned by the Spotify client.
#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify rejected the client credentials")]
    Unauthorized,

    #[error("Rate limited by Spotify API")]
    RateLimited,

    #[error("Not found on Spotify: {0}")]
    NotFound(String),

    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SpotifyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
