//! Shared building blocks for crate-digger.
//!
//! Text normalization and similarity scoring used by catalog matching, the
//! catalog domain types, typed collection records, free-form query parsing,
//! and configuration loading. Nothing in this crate performs network I/O.

pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod query;
pub mod records;
pub mod similarity;
pub mod text;

pub use catalog::{
    COARSE_THRESHOLD, CatalogCandidate, CatalogQuery, MatchThresholds, ReleaseVariant,
    TITLE_THRESHOLD,
};
pub use config::{AppConfig, SessionSettings, ValueSource, config_path};
pub use directory::UserDirectory;
pub use error::ConfigError;
pub use query::{ListScope, LookupQuery, SpotifyKind, SpotifyUrl};
pub use records::{Location, PlayLog, User, Vinyl, WantItem};
pub use similarity::score;
pub use text::{base_title, normalize};
