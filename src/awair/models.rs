use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Latest air data: GET {awair_url}
//
// The Awair local API returns one flat object with the current snapshot:
//
//   { "timestamp": "2024-01-15T19:30:00.000Z", "score": 87, "dew_point": 9.35,
//     "temp": 21.4, "humid": 45.12, "co2": 612, "voc": 180,
//     "voc_baseline": 37933, "voc_h2_raw": 25, "voc_ethanol_raw": 38,
//     "pm25": 4, "pm10_est": 6 }
//
// Only co2, voc and pm25 drive the fan; the rest is carried for logging.
// ---------------------------------------------------------------------------

/// One snapshot from the air sensor. Discarded after a single decision.
#[allow(dead_code)]
#[derive(Debug, Clone, Deserialize)]
pub struct AirData {
    pub timestamp: DateTime<Utc>,
    /// Awair score, 0-100.
    pub score: f64,
    /// °C.
    pub dew_point: f64,
    /// °C.
    pub temp: f64,
    /// Relative humidity in %.
    pub humid: f64,
    /// ppm.
    pub co2: i64,
    /// ppb.
    pub voc: i64,
    pub voc_baseline: i64,
    pub voc_h2_raw: i64,
    pub voc_ethanol_raw: i64,
    /// µg/m³.
    pub pm25: i64,
    /// µg/m³, estimated.
    pub pm10_est: i64,
}
