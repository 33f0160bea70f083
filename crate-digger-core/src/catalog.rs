//! Catalog matching domain types.

use crate::text::base_title;

/// Minimum whole-title score a candidate needs before it is considered at all.
///
/// Candidates below this are discarded without any further catalog call.
pub const COARSE_THRESHOLD: f64 = 0.4;

/// Minimum album-title score a candidate needs before its variants are fetched.
pub const TITLE_THRESHOLD: f64 = 0.8;

/// The two matcher thresholds, tuned against [`crate::similarity::score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchThresholds {
    /// Coarse filter on `"artist album"` against the full candidate title.
    pub coarse: f64,
    /// Refinement on the album title alone.
    pub title: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            coarse: COARSE_THRESHOLD,
            title: TITLE_THRESHOLD,
        }
    }
}

/// An artist/album pair to look up. Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub artist: String,
    pub album: String,
}

impl CatalogQuery {
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into().trim().to_string(),
            album: album.into().trim().to_string(),
        }
    }

    /// Parse `"Artist - Album"`. Returns `None` if either side is empty.
    pub fn parse_pair(text: &str) -> Option<Self> {
        let (artist, album) = text.split_once(" - ")?;
        let query = Self::new(artist, album);
        if query.artist.is_empty() || query.album.is_empty() {
            None
        } else {
            Some(query)
        }
    }

    /// Combined free-text query sent to the catalog search endpoint.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.artist, self.album)
    }
}

impl std::fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.artist, self.album)
    }
}

/// A scored master-level search result.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogCandidate {
    pub external_id: u64,
    pub raw_title: String,
    pub similarity_score: f64,
}

impl CatalogCandidate {
    /// The album portion of the title: any `"Artist - "` prefix removed and
    /// trailing qualifiers stripped via [`base_title`].
    pub fn album_title(&self) -> String {
        let album = match self.raw_title.split_once(" - ") {
            Some((_, album)) => album,
            None => self.raw_title.as_str(),
        };
        base_title(album)
    }
}

/// One concrete pressing of a master release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVariant {
    pub title: String,
    /// Free-text format description, e.g. `"Vinyl, LP, Album"`.
    pub format_label: String,
    /// Structured format list, e.g. `["Vinyl"]`.
    pub major_formats: Vec<String>,
    /// True when the variant title marks it as a promotional pressing.
    pub is_promotional: bool,
}

impl ReleaseVariant {
    pub fn new(
        title: impl Into<String>,
        format_label: impl Into<String>,
        major_formats: Vec<String>,
    ) -> Self {
        let title = title.into();
        let is_promotional = title.to_lowercase().contains("promo");
        Self {
            title,
            format_label: format_label.into(),
            major_formats,
            is_promotional,
        }
    }

    /// Whether either format field names vinyl (case-insensitive).
    pub fn is_vinyl(&self) -> bool {
        self.format_label.to_lowercase().contains("vinyl")
            || self
                .major_formats
                .iter()
                .any(|f| f.to_lowercase().contains("vinyl"))
    }

    /// A variant counts toward "exists" only if it is a vinyl pressing and not a promo.
    pub fn is_accepted(&self) -> bool {
        self.is_vinyl() && !self.is_promotional
    }
}
