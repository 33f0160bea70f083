use crate_digger_core::config::DiscogsSettings;

use crate::error::DiscogsError;

/// Consumer key and secret for the Discogs API.
#[derive(Debug, Clone)]
pub struct DiscogsCredentials {
    pub key: String,
    pub secret: String,
    pub user_agent: String,
}

impl DiscogsCredentials {
    /// Take credentials from resolved settings. Key and secret are required.
    pub fn from_settings(settings: &DiscogsSettings) -> Result<Self, DiscogsError> {
        let key = settings.key.clone().ok_or_else(|| {
            DiscogsError::config("Missing Discogs key. Set DISCOGS_KEY or [discogs] key in the config file")
        })?;
        let secret = settings.secret.clone().ok_or_else(|| {
            DiscogsError::config(
                "Missing Discogs secret. Set DISCOGS_SECRET or [discogs] secret in the config file",
            )
        })?;
        Ok(Self {
            key,
            secret,
            user_agent: settings.user_agent.clone(),
        })
    }

    pub(crate) fn authorization(&self) -> String {
        format!("Discogs key={}, secret={}", self.key, self.secret)
    }
}
