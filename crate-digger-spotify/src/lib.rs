//! Spotify Web API client: share-link lookups and album search.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ReleaseSource, SpotifyClient, SpotifyCredentials};
pub use error::SpotifyError;
pub use types::ReleaseSummary;
