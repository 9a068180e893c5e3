pub mod models;
pub mod session;

use chrono::{NaiveDateTime, TimeDelta};
use reqwest::Client;
use tracing::{debug, info};

use crate::{
    error::{Error, Result, TransportError},
    http,
};

use self::{
    models::{
        Function, Selection, SetHoldParams, Thermostat, ThermostatListResponse, ThermostatQuery,
        ThermostatUpdate, UpdateResponse,
    },
    session::Session,
};

/// Format of `thermostatTime` and of the hold end sent back to the thermostat.
pub const THERMOSTAT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Client for the Ecobee cloud API.
///
/// Every call goes through `Session::ensure_valid` first, so requests always
/// carry an unexpired bearer token.
#[derive(Debug)]
pub struct EcobeeClient {
    http: Client,
    thermostat_url: String,
    session: Session,
}

impl EcobeeClient {
    pub fn new(
        http: Client,
        base_url: &str,
        api_key: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            thermostat_url: http::join(base_url, "1/thermostat"),
            session: Session::new(base_url, api_key, refresh_token),
        }
    }

    /// Fetch runtime and equipment status of the registered thermostats and
    /// return the first one.
    pub async fn status(&mut self) -> Result<Thermostat> {
        let token = self.session.ensure_valid(&self.http).await?;

        let query = ThermostatQuery {
            selection: Selection::registered_with_status(),
        };
        let body = serde_json::to_string(&query)
            .map_err(|e| Error::Query(TransportError::Encode(e)))?;
        let url = http::with_params(
            &self.thermostat_url,
            &[("format", "json"), ("body", body.as_str())],
        )
        .map_err(Error::Query)?;

        debug!(url = %self.thermostat_url, "Fetching Ecobee thermostat status");
        let resp: ThermostatListResponse =
            http::fetch_json(self.http.get(url).bearer_auth(&token), &self.thermostat_url)
                .await
                .map_err(Error::Query)?;

        if let Some(status) = resp.status {
            status.check(&self.thermostat_url).map_err(Error::Query)?;
        }

        // TODO: pick a thermostat by name once more than one is registered.
        let thermostat = resp
            .thermostat_list
            .into_iter()
            .next()
            .ok_or(Error::NoThermostats)?;

        info!(
            name = %thermostat.name,
            temperature_f = thermostat.runtime.actual_temperature_f(),
            equipment_status = %thermostat.equipment_status,
            thermostat_time = %thermostat.thermostat_time,
            "Ecobee thermostat status"
        );
        Ok(thermostat)
    }

    /// Force the fan on until `reference_time + hold_minutes`, keeping the
    /// thermostat's current heat and cool setpoints.
    ///
    /// `reference_time` is in thermostat local time (`YYYY-MM-DD HH:MM:SS`),
    /// normally `thermostat.thermostat_time`. Returns the end of the hold.
    pub async fn activate_hold(
        &mut self,
        thermostat: &Thermostat,
        reference_time: &str,
        hold_minutes: i64,
    ) -> Result<NaiveDateTime> {
        let (params, until) = hold_params(thermostat, reference_time, hold_minutes)?;
        self.update(Function::SetHold(params)).await?;

        info!(until = %until, "Fan hold activated");
        Ok(until)
    }

    /// Cancel every active hold and return to the programmed schedule.
    pub async fn resume_program(&mut self) -> Result<()> {
        self.update(Function::ResumeProgram { resume_all: true }).await?;

        info!("Thermostat program resumed");
        Ok(())
    }

    async fn update(&mut self, function: Function) -> Result<()> {
        let name = function.name();
        let command_err = |source| Error::Command {
            function: name,
            source,
        };

        let token = self.session.ensure_valid(&self.http).await?;
        let url = http::with_params(&self.thermostat_url, &[("format", "json")])
            .map_err(command_err)?;
        let body = ThermostatUpdate {
            selection: Selection::registered(),
            functions: vec![function],
        };

        debug!(url = %self.thermostat_url, function = name, "Sending Ecobee thermostat update");
        let bytes = http::send(
            self.http.post(url).bearer_auth(&token).json(&body),
            &self.thermostat_url,
        )
        .await
        .map_err(command_err)?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let resp: UpdateResponse =
            http::decode(&self.thermostat_url, &bytes).map_err(command_err)?;
        if let Some(status) = resp.status {
            status.check(&self.thermostat_url).map_err(command_err)?;
        }

        Ok(())
    }
}

/// Build the `setHold` parameters for a fan hold of `hold_minutes` starting at
/// `reference_time`, along with the hold's end.
pub fn hold_params(
    thermostat: &Thermostat,
    reference_time: &str,
    hold_minutes: i64,
) -> Result<(SetHoldParams, NaiveDateTime)> {
    let start = NaiveDateTime::parse_from_str(reference_time, THERMOSTAT_TIME_FORMAT).map_err(
        |source| Error::Parse {
            value: reference_time.to_owned(),
            source,
        },
    )?;
    let until = TimeDelta::try_minutes(hold_minutes)
        .and_then(|hold| start.checked_add_signed(hold))
        .ok_or_else(|| Error::HoldWindow {
            start: reference_time.to_owned(),
            minutes: hold_minutes,
        })?;

    let params = SetHoldParams {
        hold_type: "dateTime",
        end_date: until.format("%Y-%m-%d").to_string(),
        end_time: until.format("%H:%M:%S").to_string(),
        heat_hold_temp: thermostat.runtime.desired_heat,
        cool_hold_temp: thermostat.runtime.desired_cool,
        fan: "on",
    };
    Ok((params, until))
}
