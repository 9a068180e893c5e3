//! Fan decision: a pure function of the latest air reading, the thermostat's
//! equipment status and the configured limits.

use std::fmt;

use crate::{awair::models::AirData, ecobee::models::Thermostat};

/// Equipment status reported while only the fan is running.
pub const FAN_ONLY: &str = "fan";

/// Pollutant limits and the hold length used when one is exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// ppm.
    pub co2: i64,
    /// ppb.
    pub voc: i64,
    /// µg/m³.
    pub pm25: i64,
    pub hold_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pollutant {
    Co2,
    Voc,
    Pm25,
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Pollutant::Co2 => "CO2",
            Pollutant::Voc => "VOC",
            Pollutant::Pm25 => "PM2.5",
        };
        f.write_str(s)
    }
}

/// What the thermostat is doing right now, as far as the fan is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanState {
    /// Nothing running.
    Idle,
    /// Only the fan is running, typically under a hold.
    FanHeld,
    /// Heating, cooling or anything else besides the bare fan.
    OtherEquipmentActive(String),
}

impl FanState {
    pub fn from_equipment_status(equipment_status: &str) -> Self {
        match equipment_status {
            "" => FanState::Idle,
            FAN_ONLY => FanState::FanHeld,
            other => FanState::OtherEquipmentActive(other.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FanDecision {
    /// Other equipment is running. No action may be taken this run.
    Blocked { equipment: String },
    /// At least one limit is exceeded: force the fan on.
    ActivateHold { exceeded: Vec<Pollutant> },
    /// Air is fine and the fan is running: release the hold.
    ResumeProgram,
    /// Air is fine and nothing is running.
    NoOp,
}

/// Pollutants in `reading` strictly above their limit.
pub fn exceeded(reading: &AirData, thresholds: &Thresholds) -> Vec<Pollutant> {
    [
        (Pollutant::Co2, reading.co2, thresholds.co2),
        (Pollutant::Voc, reading.voc, thresholds.voc),
        (Pollutant::Pm25, reading.pm25, thresholds.pm25),
    ]
    .into_iter()
    .filter(|(_, value, limit)| value > limit)
    .map(|(pollutant, _, _)| pollutant)
    .collect()
}

pub fn decide(reading: &AirData, status: &Thermostat, thresholds: &Thresholds) -> FanDecision {
    let state = FanState::from_equipment_status(&status.equipment_status);
    if let FanState::OtherEquipmentActive(equipment) = state {
        return FanDecision::Blocked { equipment };
    }

    let exceeded = exceeded(reading, thresholds);
    if !exceeded.is_empty() {
        return FanDecision::ActivateHold { exceeded };
    }

    match state {
        FanState::FanHeld => FanDecision::ResumeProgram,
        _ => FanDecision::NoOp,
    }
}
