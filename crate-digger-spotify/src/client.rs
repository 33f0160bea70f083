use std::future::Future;
use std::sync::Arc;

use crate_digger_core::config::SpotifySettings;
use crate_digger_core::{SpotifyKind, SpotifyUrl};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::error::SpotifyError;
use crate::types::{AlbumSearchResponse, ReleaseSummary, SpotifyObject, TokenResponse};

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Tokens are refreshed this long before Spotify says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Client id and secret for the client-credentials grant.
#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl SpotifyCredentials {
    pub fn from_settings(settings: &SpotifySettings) -> Result<Self, SpotifyError> {
        let client_id = settings.client_id.clone().ok_or_else(|| {
            SpotifyError::config(
                "Missing Spotify client id. Set SPOTIFY_CLIENT_ID or [spotify] client_id in the config file",
            )
        })?;
        let client_secret = settings.client_secret.clone().ok_or_else(|| {
            SpotifyError::config(
                "Missing Spotify client secret. Set SPOTIFY_CLIENT_SECRET or [spotify] client_secret in the config file",
            )
        })?;
        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn new(value: String, expires_in: Duration, now: Instant) -> Self {
        Self {
            value,
            refresh_at: now + expires_in.saturating_sub(EXPIRY_MARGIN),
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        now < self.refresh_at
    }
}

/// Resolves share links to release details.
pub trait ReleaseSource: Send + Sync {
    fn lookup_release(&self, url: &SpotifyUrl) -> impl Future<Output = Result<ReleaseSummary, SpotifyError>> + Send;
}

/// Spotify Web API client with a cached app access token.
#[derive(Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    creds: SpotifyCredentials,
    api_base: String,
    token_url: String,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl SpotifyClient {
    pub fn new(creds: SpotifyCredentials) -> Result<Self, SpotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            creds,
            api_base: API_BASE.to_string(),
            token_url: TOKEN_URL.to_string(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    /// Point the client at different API and token endpoints.
    pub fn with_endpoints(mut self, api_base: impl Into<String>, token_url: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.token_url = token_url.into();
        self
    }

    /// Fetch display data for a share link.
    pub async fn lookup_release(&self, url: &SpotifyUrl) -> Result<ReleaseSummary, SpotifyError> {
        let obj: SpotifyObject = self.get_json(&object_path(url), &[]).await?;
        log::debug!("Spotify {} {} -> {:?}", url.kind.as_str(), url.id, obj.name);
        Ok(ReleaseSummary::from(obj))
    }

    /// Best album match for an artist/album pair, as a share link.
    pub async fn find_album(&self, artist: &str, album: &str) -> Result<Option<SpotifyUrl>, SpotifyError> {
        let params = [
            ("q", format!("album:{album} artist:{artist}")),
            ("type", "album".to_string()),
            ("limit", "1".to_string()),
        ];
        let response: AlbumSearchResponse = self.get_json("/search", &params).await?;
        Ok(response.albums.items.into_iter().next().map(|item| SpotifyUrl {
            kind: SpotifyKind::Album,
            id: item.id,
        }))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, SpotifyError> {
        let token = self.access_token().await?;

        let resp = self
            .http
            .get(format!("{}{}", self.api_base, path))
            .bearer_auth(token)
            .query(params)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            // Force a new token on the next call.
            self.token.lock().await.take();
            return Err(SpotifyError::Unauthorized);
        }
        check_status(status, path, &text)?;

        serde_json::from_str(&text)
            .map_err(|e| SpotifyError::Malformed(format!("{e}. Response: {}", snippet(&text))))
    }

    async fn access_token(&self) -> Result<String, SpotifyError> {
        let mut cached = self.token.lock().await;
        let now = Instant::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        log::debug!("Requesting Spotify access token");
        let resp = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SpotifyError::Unauthorized);
        }
        check_status(status, "token", &text)?;

        let token: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| SpotifyError::Malformed(format!("token response: {e}")))?;
        let entry = CachedToken::new(token.access_token, Duration::from_secs(token.expires_in), now);
        let value = entry.value.clone();
        *cached = Some(entry);
        Ok(value)
    }
}

impl ReleaseSource for SpotifyClient {
    async fn lookup_release(&self, url: &SpotifyUrl) -> Result<ReleaseSummary, SpotifyError> {
        SpotifyClient::lookup_release(self, url).await
    }
}

fn object_path(url: &SpotifyUrl) -> String {
    format!("/{}s/{}", url.kind.as_str(), url.id)
}

fn check_status(status: reqwest::StatusCode, what: &str, body: &str) -> Result<(), SpotifyError> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(SpotifyError::RateLimited);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SpotifyError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        return Err(SpotifyError::ServerError {
            status: status.as_u16(),
            message: snippet(body).to_string(),
        });
    }
    Ok(())
}

fn snippet(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}
