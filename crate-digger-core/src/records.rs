//! Typed collection records.
//!
//! These are the only shapes that cross the store boundary; the store
//! converts rows into them in one place per table.

use chrono::{DateTime, NaiveDate, Utc};

/// A collection member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// A record in the shared collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Vinyl {
    pub id: i64,
    pub artist: String,
    pub album: String,
    pub date_purchased: Option<NaiveDate>,
    /// Name of the store it was bought at.
    pub purchase_location: Option<String>,
    pub price: Option<f64>,
    /// Running time in minutes.
    pub length: Option<u32>,
    pub notes: Option<String>,
    pub play_count: u32,
    pub image_url: Option<String>,
    pub double_lp: bool,
    /// Member names.
    pub owners: Vec<String>,
    /// Member names.
    pub liked_by: Vec<String>,
}

impl Vinyl {
    /// A record with only the natural key set, ready for insertion.
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            id: 0,
            artist: artist.into(),
            album: album.into(),
            date_purchased: None,
            purchase_location: None,
            price: None,
            length: None,
            notes: None,
            play_count: 0,
            image_url: None,
            double_lp: false,
            owners: Vec::new(),
            liked_by: Vec::new(),
        }
    }
}

/// One listening session of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayLog {
    pub artist: String,
    pub album: String,
    /// Member ids.
    pub listeners: Vec<i64>,
    pub played_at: DateTime<Utc>,
}

/// An entry on the shared want list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WantItem {
    pub id: i64,
    pub artist: String,
    pub album: String,
    pub image_url: Option<String>,
    pub notes: Option<String>,
    /// Member names.
    pub searchers: Vec<String>,
}

/// A record store, physical or online.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub physical: bool,
}
