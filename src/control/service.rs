use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::{
    awair::AwairClient,
    ecobee::EcobeeClient,
    error::{Error, Result},
};

use super::policy::{self, FanDecision, Thresholds};

/// What a single control run ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Sensor-only mode: the decision was made but not acted on.
    SensorOnly(FanDecision),
    NoOp,
    HoldActivated { until: NaiveDateTime },
    ProgramResumed,
}

/// One pass of the control loop: read the air, read the thermostat, decide,
/// act. Scheduling is left to whatever invokes the binary.
pub struct ControlService {
    awair: AwairClient,
    ecobee: EcobeeClient,
    thresholds: Thresholds,
    sensor_only: bool,
}

impl ControlService {
    pub fn new(
        awair: AwairClient,
        ecobee: EcobeeClient,
        thresholds: Thresholds,
        sensor_only: bool,
    ) -> Self {
        Self {
            awair,
            ecobee,
            thresholds,
            sensor_only,
        }
    }

    /// Run the control steps once. Any error aborts the remaining steps.
    pub async fn run_once(&mut self) -> Result<RunOutcome> {
        let reading = self.awair.get().await?;
        let status = self.ecobee.status().await?;

        info!(
            co2 = reading.co2,
            co2_limit = self.thresholds.co2,
            voc = reading.voc,
            voc_limit = self.thresholds.voc,
            pm25 = reading.pm25,
            pm25_limit = self.thresholds.pm25,
            score = reading.score,
            temp = reading.temp,
            humid = reading.humid,
            "Air quality reading"
        );

        match policy::decide(&reading, &status, &self.thresholds) {
            FanDecision::Blocked { equipment } => {
                warn!(equipment = %equipment, "Other equipment running; leaving the fan alone");
                Err(Error::EquipmentConflict { equipment })
            }
            decision if self.sensor_only => {
                info!(decision = ?decision, "Sensor-only mode; no command sent");
                Ok(RunOutcome::SensorOnly(decision))
            }
            FanDecision::ActivateHold { exceeded } => {
                let exceeded: Vec<String> = exceeded.iter().map(ToString::to_string).collect();
                info!(
                    exceeded = %exceeded.join(","),
                    hold_minutes = self.thresholds.hold_minutes,
                    "Fan on"
                );
                let until = self
                    .ecobee
                    .activate_hold(&status, &status.thermostat_time, self.thresholds.hold_minutes)
                    .await?;
                Ok(RunOutcome::HoldActivated { until })
            }
            FanDecision::ResumeProgram => {
                info!("Resuming program");
                self.ecobee.resume_program().await?;
                Ok(RunOutcome::ProgramResumed)
            }
            FanDecision::NoOp => {
                info!("Air quality within limits and nothing running");
                Ok(RunOutcome::NoOp)
            }
        }
    }
}
