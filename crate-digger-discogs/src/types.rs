use crate_digger_core::ReleaseVariant;
use serde::Deserialize;

/// Top-level response from `/database/search`.
///
/// Results are kept as raw JSON so one malformed entry does not sink the
/// whole page; see [`crate::client::DiscogsClient::search_masters`].
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// One master-level search hit. Every field is optional; the matcher skips
/// hits without an id or title.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct MasterResult {
    #[serde(default)]
    pub id: Option<u64>,
    /// Usually `"Artist - Album"`.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub format: Vec<String>,
    #[serde(default, rename = "type")]
    pub result_type: Option<String>,
}

impl MasterResult {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: Some(title.into()),
            format: Vec::new(),
            result_type: Some("master".to_string()),
        }
    }
}

/// Top-level response from `/masters/{id}/versions`.
#[derive(Debug, Deserialize)]
pub struct VersionsResponse {
    #[serde(default)]
    pub versions: Vec<serde_json::Value>,
}

/// One release under a master.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct MasterVersion {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Free-text format, e.g. `"LP, Album, RE"` or `"Vinyl, 12\""`.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub major_formats: Vec<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
}

impl From<MasterVersion> for ReleaseVariant {
    fn from(v: MasterVersion) -> Self {
        ReleaseVariant::new(
            v.title.unwrap_or_default(),
            v.format.unwrap_or_default(),
            v.major_formats,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_tolerates_missing_fields() {
        let r: MasterResult = serde_json::from_str(r#"{"title": "Radiohead - OK Computer"}"#).unwrap();
        assert_eq!(r.id, None);
        assert_eq!(r.title.as_deref(), Some("Radiohead - OK Computer"));
        assert!(r.format.is_empty());
    }

    #[test]
    fn test_version_into_variant() {
        let v: MasterVersion = serde_json::from_str(
            r#"{"id": 1, "title": "OK Computer (Promo)", "format": "LP, Album", "major_formats": ["Vinyl"]}"#,
        )
        .unwrap();
        let variant = ReleaseVariant::from(v);
        assert!(variant.is_vinyl());
        assert!(variant.is_promotional);
        assert!(!variant.is_accepted());
    }

    #[test]
    fn test_version_missing_formats_is_not_vinyl() {
        let v: MasterVersion = serde_json::from_str(r#"{"id": 2}"#).unwrap();
        let variant = ReleaseVariant::from(v);
        assert!(!variant.is_vinyl());
    }
}
