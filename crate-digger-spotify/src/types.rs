use serde::Deserialize;

/// Display data for one album, track or artist link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSummary {
    /// Artist names joined with `", "`.
    pub artists: String,
    pub title: String,
    pub artwork_url: Option<String>,
    pub release_date: Option<String>,
    pub track_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ArtistRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct Image {
    pub url: String,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct AlbumRef {
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
}

/// The fields shared by album, track and artist objects. Anything missing
/// defaults, so one shape covers all three.
#[derive(Debug, Deserialize, Default)]
pub(crate) struct SpotifyObject {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub images: Vec<Image>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub total_tracks: Option<u32>,
    /// Present on tracks only.
    #[serde(default)]
    pub album: Option<AlbumRef>,
}

impl From<SpotifyObject> for ReleaseSummary {
    fn from(obj: SpotifyObject) -> Self {
        let artists = if obj.artists.is_empty() {
            // Artist links describe themselves.
            obj.name.clone()
        } else {
            obj.artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };

        let album = obj.album.unwrap_or_default();
        let artwork_url = obj
            .images
            .into_iter()
            .chain(album.images)
            .map(|i| i.url)
            .find(|u| !u.is_empty());

        ReleaseSummary {
            artists,
            title: obj.name,
            artwork_url,
            release_date: obj.release_date.or(album.release_date),
            track_count: obj.total_tracks.or(album.total_tracks),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumSearchResponse {
    pub albums: AlbumPage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumPage {
    #[serde(default)]
    pub items: Vec<AlbumItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AlbumItem {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_summary() {
        let obj: SpotifyObject = serde_json::from_str(
            r#"{
                "name": "OK Computer",
                "artists": [{"name": "Radiohead"}],
                "images": [{"url": "https://i.scdn.co/image/large"}, {"url": "https://i.scdn.co/image/small"}],
                "release_date": "1997-05-21",
                "total_tracks": 12
            }"#,
        )
        .unwrap();
        let summary = ReleaseSummary::from(obj);
        assert_eq!(summary.artists, "Radiohead");
        assert_eq!(summary.title, "OK Computer");
        assert_eq!(summary.artwork_url.as_deref(), Some("https://i.scdn.co/image/large"));
        assert_eq!(summary.release_date.as_deref(), Some("1997-05-21"));
        assert_eq!(summary.track_count, Some(12));
    }

    #[test]
    fn test_track_summary_falls_back_to_album() {
        let obj: SpotifyObject = serde_json::from_str(
            r#"{
                "name": "Windowlicker",
                "artists": [{"name": "Aphex Twin"}, {"name": "Someone Else"}],
                "album": {"images": [{"url": "https://i.scdn.co/image/a"}], "release_date": "1999", "total_tracks": 3}
            }"#,
        )
        .unwrap();
        let summary = ReleaseSummary::from(obj);
        assert_eq!(summary.artists, "Aphex Twin, Someone Else");
        assert_eq!(summary.artwork_url.as_deref(), Some("https://i.scdn.co/image/a"));
        assert_eq!(summary.release_date.as_deref(), Some("1999"));
        assert_eq!(summary.track_count, Some(3));
    }

    #[test]
    fn test_artist_summary() {
        let obj: SpotifyObject = serde_json::from_str(r#"{"name": "Boards of Canada", "images": []}"#).unwrap();
        let summary = ReleaseSummary::from(obj);
        assert_eq!(summary.artists, "Boards of Canada");
        assert_eq!(summary.artwork_url, None);
        assert_eq!(summary.track_count, None);
    }
}
