use serde::{Deserialize, Serialize};

use crate::error::TransportError;

// ---------------------------------------------------------------------------
// Status envelope
//
// Ecobee responses carry a status object next to the payload:
//
//   { ..., "status": { "code": 0, "message": "" } }
//
// `code` is 0 on success. Most failures also come back as non-2xx, but a
// non-zero code inside a 2xx body is still a failure.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl ApiStatus {
    pub fn check(self, url: &str) -> Result<(), TransportError> {
        if self.code == 0 {
            Ok(())
        } else {
            Err(TransportError::Api {
                url: url.to_owned(),
                code: self.code,
                message: self.message,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Token: GET /token?grant_type=refresh_token&code=...&client_id=...
// ---------------------------------------------------------------------------

/// Response of the token refresh endpoint.
///
/// Ecobee echoes a refresh token here, but this integration keeps using the
/// configured one.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    /// Validity period in seconds.
    pub expires_in: i64,
    pub scope: String,
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Which thermostats a request applies to, and which sections to return.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selection_type: &'static str,
    pub selection_match: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_runtime: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_equipment_status: Option<bool>,
}

impl Selection {
    /// Every thermostat registered to the account.
    pub fn registered() -> Self {
        Self {
            selection_type: "registered",
            selection_match: "",
            include_runtime: None,
            include_equipment_status: None,
        }
    }

    /// Registered thermostats with the runtime and equipment-status sections.
    pub fn registered_with_status() -> Self {
        Self {
            include_runtime: Some(true),
            include_equipment_status: Some(true),
            ..Self::registered()
        }
    }
}

// ---------------------------------------------------------------------------
// Thermostat list: GET /1/thermostat?format=json&body={"selection":...}
// ---------------------------------------------------------------------------

/// Value of the `body` query parameter on the listing request.
#[derive(Debug, Serialize)]
pub struct ThermostatQuery {
    pub selection: Selection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermostatListResponse {
    #[serde(default)]
    pub thermostat_list: Vec<Thermostat>,
    pub status: Option<ApiStatus>,
}

/// One thermostat as returned by the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thermostat {
    pub name: String,
    pub runtime: Runtime,
    /// Comma-separated running equipment, e.g. `"fan"` or `"heatPump,fan"`.
    /// Empty when nothing is running.
    #[serde(default)]
    pub equipment_status: String,
    /// Local time at the thermostat, `YYYY-MM-DD HH:MM:SS`.
    pub thermostat_time: String,
}

/// Runtime section. Temperatures are in tenths of a degree Fahrenheit
/// (`705` = 70.5 °F).
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Runtime {
    pub actual_temperature: i64,
    pub actual_humidity: i64,
    pub desired_heat: i64,
    pub desired_cool: i64,
    pub desired_humidity: i64,
    pub desired_dehumidity: i64,
    pub desired_fan_mode: String,
}

impl Runtime {
    pub fn actual_temperature_f(&self) -> f64 {
        self.actual_temperature as f64 / 10.0
    }
}

// ---------------------------------------------------------------------------
// Thermostat update: POST /1/thermostat?format=json
// ---------------------------------------------------------------------------

/// Request body for the update endpoint: a selection plus function calls.
#[derive(Debug, Serialize)]
pub struct ThermostatUpdate {
    pub selection: Selection,
    pub functions: Vec<Function>,
}

/// A thermostat function call, serialized as `{"type": ..., "params": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "params", rename_all = "camelCase")]
pub enum Function {
    SetHold(SetHoldParams),
    #[serde(rename_all = "camelCase")]
    ResumeProgram { resume_all: bool },
}

impl Function {
    /// Function name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Function::SetHold(_) => "setHold",
            Function::ResumeProgram { .. } => "resumeProgram",
        }
    }
}

/// Parameters of a `dateTime` hold. Setpoints use the runtime units.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHoldParams {
    pub hold_type: &'static str,
    /// `YYYY-MM-DD`, thermostat local time.
    pub end_date: String,
    /// `HH:MM:SS`, thermostat local time.
    pub end_time: String,
    pub heat_hold_temp: i64,
    pub cool_hold_temp: i64,
    pub fan: &'static str,
}

/// Response of the update endpoint. Only the status is of interest.
#[derive(Debug, Deserialize)]
pub struct UpdateResponse {
    pub status: Option<ApiStatus>,
}
