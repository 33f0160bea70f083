use std::sync::Arc;

use crate_digger_core::ReleaseVariant;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::credentials::DiscogsCredentials;
use crate::error::DiscogsError;
use crate::matcher::CatalogSource;
use crate::types::{MasterResult, MasterVersion, SearchResponse, VersionsResponse};

const BASE_URL: &str = "https://api.discogs.com";
/// Authenticated clients get 60 requests per minute.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(1000);
/// Versions page size. A master rarely has more pressings than this, and the
/// first page is ordered with the main releases first.
const VERSIONS_PER_PAGE: usize = 100;

/// HTTP client for the Discogs database API with request pacing.
#[derive(Clone)]
pub struct DiscogsClient {
    http: reqwest::Client,
    creds: DiscogsCredentials,
    base_url: String,
    last_request: Arc<Mutex<Instant>>,
}

impl DiscogsClient {
    pub fn new(creds: DiscogsCredentials) -> Result<Self, DiscogsError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(creds.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            creds,
            base_url: BASE_URL.to_string(),
            last_request: Arc::new(Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL)),
        })
    }

    /// Point the client at a different API root (a proxy or local mirror).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Search master releases by free text, at most `limit` results.
    ///
    /// Entries that cannot be decoded are dropped with a warning; the rest of
    /// the page is still returned.
    pub async fn search_masters(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MasterResult>, DiscogsError> {
        let params = [
            ("q", query.to_string()),
            ("type", "master".to_string()),
            ("per_page", limit.to_string()),
            ("page", "1".to_string()),
        ];
        let response: SearchResponse = self.get_json("/database/search", &params).await?;
        let mut results = decode_each::<MasterResult>(response.results, "search result");
        results.truncate(limit);
        log::debug!("Discogs search {:?}: {} result(s)", query, results.len());
        Ok(results)
    }

    /// Fetch the release versions of one master.
    pub async fn master_versions(&self, master_id: u64) -> Result<Vec<MasterVersion>, DiscogsError> {
        let params = [("per_page", VERSIONS_PER_PAGE.to_string()), ("page", "1".to_string())];
        let response: VersionsResponse = self
            .get_json(&format!("/masters/{master_id}/versions"), &params)
            .await?;
        let versions = decode_each::<MasterVersion>(response.versions, "master version");
        log::debug!("Discogs master {}: {} version(s)", master_id, versions.len());
        Ok(versions)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, DiscogsError> {
        self.rate_limit().await;

        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, self.creds.authorization())
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DiscogsError::InvalidCredentials(
                "Discogs rejected the consumer key/secret".to_string(),
            ));
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DiscogsError::RateLimited);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DiscogsError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(DiscogsError::ServerError {
                status: status.as_u16(),
                message: snippet(&text).to_string(),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            DiscogsError::malformed(format!("{e}. Response: {}", snippet(&text)))
        })
    }

    /// Enforce pacing: wait until at least MIN_REQUEST_INTERVAL has passed
    /// since the last API request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}

impl CatalogSource for DiscogsClient {
    async fn search_masters(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MasterResult>, DiscogsError> {
        DiscogsClient::search_masters(self, query, limit).await
    }

    async fn master_variants(&self, master_id: u64) -> Result<Vec<ReleaseVariant>, DiscogsError> {
        let versions = self.master_versions(master_id).await?;
        Ok(versions.into_iter().map(ReleaseVariant::from).collect())
    }
}

/// Decode each element independently, dropping the ones that don't fit.
fn decode_each<T: DeserializeOwned>(values: Vec<serde_json::Value>, what: &str) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                log::warn!("Skipping malformed Discogs {what}: {e}");
                None
            }
        })
        .collect()
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_each_drops_malformed_entries() {
        let values = vec![
            serde_json::json!({"id": 1, "title": "Radiohead - OK Computer"}),
            serde_json::json!({"id": "not-a-number", "title": "Broken"}),
            serde_json::json!({"title": "No Id"}),
        ];
        let decoded = decode_each::<MasterResult>(values, "search result");
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].id, Some(1));
        assert_eq!(decoded[1].id, None);
    }

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let long = "é".repeat(300);
        assert_eq!(snippet(&long).chars().count(), 200);
        assert_eq!(snippet("short"), "short");
    }

    #[tokio::test]
    async fn test_with_base_url_trims_trailing_slash() {
        let creds = DiscogsCredentials {
            key: "k".into(),
            secret: "s".into(),
            user_agent: "test/1.0".into(),
        };
        let client = DiscogsClient::new(creds).unwrap().with_base_url("http://localhost:9/");
        assert_eq!(client.base_url, "http://localhost:9");
    }
}
