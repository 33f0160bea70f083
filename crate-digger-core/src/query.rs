//! Parsing of free-form user input.

use crate::catalog::CatalogQuery;
use crate::directory::UserDirectory;

const SPOTIFY_HOST: &str = "open.spotify.com/";

/// Kind of object a Spotify link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpotifyKind {
    Album,
    Track,
    Artist,
}

impl SpotifyKind {
    /// Path segment used both in share links and API routes (singular).
    pub fn as_str(self) -> &'static str {
        match self {
            SpotifyKind::Album => "album",
            SpotifyKind::Track => "track",
            SpotifyKind::Artist => "artist",
        }
    }

    fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "album" => Some(SpotifyKind::Album),
            "track" => Some(SpotifyKind::Track),
            "artist" => Some(SpotifyKind::Artist),
            _ => None,
        }
    }
}

/// A parsed `open.spotify.com` share link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyUrl {
    pub kind: SpotifyKind,
    pub id: String,
}

impl SpotifyUrl {
    /// Find a Spotify share link anywhere in `text`.
    ///
    /// Accepts an optional locale segment (`/intl-de/`) and ignores any query
    /// string after the id.
    ///
    /// ```
    /// use crate_digger_core::query::{SpotifyKind, SpotifyUrl};
    ///
    /// let url = SpotifyUrl::parse("https://open.spotify.com/album/6dVIqQ8qmQ5GBnJ9shOYGE?si=x").unwrap();
    /// assert_eq!(url.kind, SpotifyKind::Album);
    /// assert_eq!(url.id, "6dVIqQ8qmQ5GBnJ9shOYGE");
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let start = text.find(SPOTIFY_HOST)? + SPOTIFY_HOST.len();
        let mut segments = text[start..].split('/');

        let mut segment = segments.next()?;
        if segment.starts_with("intl-") {
            segment = segments.next()?;
        }
        let kind = SpotifyKind::from_segment(segment)?;

        let id: String = segments
            .next()?
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if id.is_empty() {
            return None;
        }
        Some(Self { kind, id })
    }

    /// Canonical share link.
    pub fn share_url(&self) -> String {
        format!("https://{SPOTIFY_HOST}{}/{}", self.kind.as_str(), self.id)
    }
}

/// What a free-form lookup string refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupQuery {
    Spotify(SpotifyUrl),
    Pair(CatalogQuery),
    Search(String),
}

impl LookupQuery {
    /// Classify input as a Spotify link, an `"Artist - Album"` pair, or a plain search term.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(url) = SpotifyUrl::parse(text) {
            return LookupQuery::Spotify(url);
        }
        if let Some(pair) = CatalogQuery::parse_pair(text) {
            return LookupQuery::Pair(pair);
        }
        LookupQuery::Search(text.to_string())
    }
}

/// Which rows a list command covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Everything.
    Full,
    /// Rows belonging to one member (canonical member name).
    Member(String),
    /// Rows whose artist or album contains the term.
    Search(String),
}

impl ListScope {
    /// No words means the full list; a single word naming a known member scopes
    /// to that member; anything else is a search term.
    pub fn parse(args: &str, directory: &UserDirectory) -> Self {
        let words: Vec<&str> = args.split_whitespace().collect();
        match words.as_slice() {
            [] => ListScope::Full,
            [word] => match directory.member(word) {
                Some(member) => ListScope::Member(member.to_string()),
                None => ListScope::Search(word.to_string()),
            },
            _ => ListScope::Search(args.trim().to_string()),
        }
    }
}
