//! Error types shared by the sensor client, the thermostat client and the
//! control run.
//!
//! `TransportError` describes what went wrong on the wire; `Error` says which
//! step of the run it happened in. Nothing here is retried: every error is
//! handed straight back to the caller and ends the run.

use reqwest::StatusCode;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS, timeout or body read failure.
    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote answered outside 2xx. `body` is kept for diagnostics.
    #[error("status {status} returned from {url} with response: {body}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        body: String,
    },

    /// The body did not match the expected JSON schema.
    #[error("failed to decode response from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode request body")]
    Encode(#[source] serde_json::Error),

    #[error("invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Ecobee reported a failure inside a 2xx response body.
    #[error("API error from {url}: code={code}, message={message}")]
    Api {
        url: String,
        code: i64,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Run errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum Error {
    #[error("air sensor read failed")]
    Sensor(#[source] TransportError),

    /// Fatal for the run: there is no cached token to fall back to.
    #[error("thermostat access token refresh failed")]
    Refresh(#[source] TransportError),

    #[error("thermostat status query failed")]
    Query(#[source] TransportError),

    #[error("thermostat status query returned no thermostats")]
    NoThermostats,

    #[error("thermostat command {function} failed")]
    Command {
        function: &'static str,
        #[source]
        source: TransportError,
    },

    #[error("invalid thermostat time {value:?}")]
    Parse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("a {minutes} minute hold starting at {start} ends out of range")]
    HoldWindow { start: String, minutes: i64 },

    /// Heating or cooling is running; the fan is left alone.
    #[error("equipment already running: {equipment:?}")]
    EquipmentConflict { equipment: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
