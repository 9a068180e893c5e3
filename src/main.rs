mod awair;
mod config;
mod control;
mod ecobee;
mod error;
mod http;

#[cfg(test)]
mod test_support;

use std::{process::ExitCode, time::Duration};

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    awair::AwairClient,
    config::Config,
    control::{ControlService, RunOutcome},
    ecobee::EcobeeClient,
};

/// Runs one control pass and exits. Meant to be started by a timer.
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the timer unit may set the variables itself.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(outcome) => {
            info!(outcome = ?outcome, "Run complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{e:#}"), "Run failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunOutcome> {
    let config = Config::from_env().context("invalid configuration")?;

    let http = http::build_client(Duration::from_secs(config.http_timeout_secs))
        .context("failed to build HTTP client")?;

    let awair = AwairClient::new(http.clone(), &config.awair_url);
    let ecobee = EcobeeClient::new(
        http,
        &config.ecobee_base_url,
        &config.ecobee_api_key,
        &config.ecobee_refresh_token,
    );

    let mut control = ControlService::new(awair, ecobee, config.thresholds, config.sensor_only);
    Ok(control.run_once().await?)
}
