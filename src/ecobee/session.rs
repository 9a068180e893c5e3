use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    error::{Error, Result, TransportError},
    http,
};

use super::models::TokenResponse;

/// Seconds shaved off every token lifetime so a request never races expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

/// Ecobee OAuth session: the configured refresh token plus the access token
/// derived from it.
///
/// A session belongs to exactly one `EcobeeClient` and is only touched through
/// `&mut self`, so at most one refresh happens per validity window. Sharing it
/// between concurrent callers would need a lock around `ensure_valid`.
#[derive(Debug)]
pub struct Session {
    token_url: String,
    api_key: String,
    /// Never rewritten: Ecobee does not rotate it for this integration.
    refresh_token: String,
    token: Option<CachedToken>,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Starts with no access token, so the first authenticated call refreshes.
    pub fn new(base_url: &str, api_key: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            token_url: http::join(base_url, "token"),
            api_key: api_key.into(),
            refresh_token: refresh_token.into(),
            token: None,
        }
    }

    /// Whether the cached access token is still usable at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.token.as_ref().is_some_and(|t| now < t.expires_at)
    }

    /// Returns a valid access token, refreshing it first if it has expired.
    pub async fn ensure_valid(&mut self, client: &Client) -> Result<String> {
        match &self.token {
            Some(token) if self.is_valid_at(Utc::now()) => return Ok(token.access_token.clone()),
            _ => {}
        }

        info!("Refreshing Ecobee access token");
        let resp = self.refresh(client).await.map_err(Error::Refresh)?;
        let expires_at = expiry(Utc::now(), resp.expires_in);
        debug!(expires_at = %expires_at, "Ecobee access token refreshed");

        self.token = Some(CachedToken {
            access_token: resp.access_token.clone(),
            expires_at,
        });
        Ok(resp.access_token)
    }

    async fn refresh(&self, client: &Client) -> Result<TokenResponse, TransportError> {
        let url = http::with_params(
            &self.token_url,
            &[
                ("grant_type", "refresh_token"),
                ("code", self.refresh_token.as_str()),
                ("client_id", self.api_key.as_str()),
            ],
        )?;

        // Logged without the query string: it carries the refresh token.
        debug!(url = %self.token_url, "Requesting Ecobee token");
        http::fetch_json(client.get(url), &self.token_url).await
    }
}

/// Absolute expiry for a token granted at `now` with a lifetime of `expires_in` seconds.
///
/// Lifetimes at or under the margin expire immediately; lifetimes past the
/// calendar's end saturate at its last instant.
fn expiry(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    let lifetime = expires_in.saturating_sub(EXPIRY_MARGIN_SECS).max(0);
    TimeDelta::try_seconds(lifetime)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
