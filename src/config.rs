use std::{fmt::Display, str::FromStr};

use anyhow::{bail, Context, Result};
use reqwest::Url;

use crate::control::policy::Thresholds;

pub const DEFAULT_ECOBEE_BASE_URL: &str = "https://api.ecobee.com/";

#[derive(Debug, Clone)]
pub struct Config {
    /// Awair local API URL; requested as-is.
    pub awair_url: String,
    pub ecobee_base_url: String,
    pub ecobee_api_key: String,
    pub ecobee_refresh_token: String,
    pub thresholds: Thresholds,
    /// Read and report only; never send a thermostat command.
    pub sensor_only: bool,
    /// Per-request transport timeout in seconds.
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("missing required env var: {key}"))
        };
        let optional = |key: &str, default: &str| -> String {
            lookup(key).unwrap_or_else(|| default.to_owned())
        };

        let awair_url = url(&required("AWAIR_URL")?, "AWAIR_URL")?;
        let ecobee_base_url = url(
            &optional("ECOBEE_BASE_URL", DEFAULT_ECOBEE_BASE_URL),
            "ECOBEE_BASE_URL",
        )?;

        let thresholds = Thresholds {
            co2: non_negative(&required("CO2_LIMIT")?, "CO2_LIMIT")?,
            voc: non_negative(&required("VOC_LIMIT")?, "VOC_LIMIT")?,
            pm25: non_negative(&required("PM25_LIMIT")?, "PM25_LIMIT")?,
            hold_minutes: positive(&required("FAN_TIME_MINS")?, "FAN_TIME_MINS")?,
        };

        Ok(Self {
            awair_url,
            ecobee_base_url,
            ecobee_api_key: required("ECOBEE_API_KEY")?,
            ecobee_refresh_token: required("ECOBEE_REFRESH_TOKEN")?,
            thresholds,
            sensor_only: parse_bool(&optional("SENSOR_ONLY", "false"))
                .context("SENSOR_ONLY must be true or false")?,
            http_timeout_secs: positive(&optional("HTTP_TIMEOUT_SECS", "30"), "HTTP_TIMEOUT_SECS")?,
        })
    }
}

fn url(raw: &str, key: &str) -> Result<String> {
    let raw = raw.trim();
    Url::parse(raw).with_context(|| format!("{key} must be an absolute URL, got: {raw:?}"))?;
    Ok(raw.to_owned())
}

fn number<T>(raw: &str, key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} must be an integer, got: {raw:?}"))
}

fn non_negative<T>(raw: &str, key: &str) -> Result<T>
where
    T: FromStr + PartialOrd + Default + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: T = number(raw, key)?;
    if value < T::default() {
        bail!("{key} must not be negative, got: {value}");
    }
    Ok(value)
}

fn positive<T>(raw: &str, key: &str) -> Result<T>
where
    T: FromStr + PartialOrd + Default + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: T = number(raw, key)?;
    if value <= T::default() {
        bail!("{key} must be greater than zero, got: {value}");
    }
    Ok(value)
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => bail!("not a boolean: {other:?}"),
    }
}
