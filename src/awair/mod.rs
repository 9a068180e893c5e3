pub mod models;

use reqwest::Client;
use tracing::debug;

use crate::{
    error::{Error, Result},
    http,
};

use self::models::AirData;

/// Reads the current snapshot from an Awair device's local HTTP API.
#[derive(Debug, Clone)]
pub struct AwairClient {
    http: Client,
    url: String,
}

impl AwairClient {
    /// `url` is requested as-is: the local API root serves the latest reading.
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fetch the latest air data. One attempt, no retry.
    pub async fn get(&self) -> Result<AirData> {
        debug!(url = %self.url, "Fetching Awair air data");
        http::fetch_json(self.http.get(&self.url), &self.url)
            .await
            .map_err(Error::Sensor)
    }
}
