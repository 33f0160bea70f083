pub mod client;
pub mod credentials;
pub mod error;
pub mod matcher;
pub mod types;

pub use client::DiscogsClient;
pub use credentials::DiscogsCredentials;
pub use error::{DiscogsError, MatchError};
pub use matcher::{CatalogMatch, CatalogMatcher, CatalogSource, SEARCH_LIMIT, rank_candidates};
pub use types::{MasterResult, MasterVersion};
