//! In-process fake of the Awair local API and the Ecobee cloud API.
//!
//! Each test starts its own server on an ephemeral port, points the real
//! clients at it and then inspects what was recorded.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serve `router` on `127.0.0.1:0` and return its base URL (no trailing slash).
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
}

#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub awair_requests: usize,
    pub token_requests: Vec<RecordedRequest>,
    pub status_requests: Vec<RecordedRequest>,
    pub command_requests: Vec<RecordedRequest>,
    pub command_bodies: Vec<Value>,
}

pub struct FakeApi {
    pub awair_status: StatusCode,
    pub awair_body: Value,
    pub token_status: StatusCode,
    pub expires_in: i64,
    pub status_body: Value,
    pub command_status: StatusCode,
    pub command_body: Value,
    pub recorded: Mutex<Recorded>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            awair_status: StatusCode::OK,
            awair_body: air_data(400, 50, 5),
            token_status: StatusCode::OK,
            expires_in: 3600,
            status_body: thermostat_list(&[thermostat("")]),
            command_status: StatusCode::OK,
            command_body: json!({ "status": { "code": 0, "message": "" } }),
            recorded: Mutex::new(Recorded::default()),
        }
    }
}

/// A running fake with the URLs the clients should be configured with.
pub struct Running {
    pub api: Arc<FakeApi>,
    pub awair_url: String,
    pub ecobee_base_url: String,
}

impl Running {
    pub fn recorded(&self) -> Recorded {
        self.api.recorded.lock().unwrap().clone()
    }
}

impl FakeApi {
    pub async fn start(self) -> Running {
        let api = Arc::new(self);
        let router = Router::new()
            .route("/awair", get(awair))
            .route("/ecobee/token", get(token))
            .route("/ecobee/1/thermostat", get(status).post(command))
            .with_state(api.clone());
        let base = serve(router).await;

        Running {
            api,
            awair_url: format!("{base}/awair"),
            ecobee_base_url: format!("{base}/ecobee/"),
        }
    }
}

fn recorded_request(headers: &HeaderMap, query: HashMap<String, String>) -> RecordedRequest {
    RecordedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        query,
    }
}

async fn awair(State(api): State<Arc<FakeApi>>) -> Response {
    api.recorded.lock().unwrap().awair_requests += 1;
    (api.awair_status, Json(api.awair_body.clone())).into_response()
}

async fn token(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let n = {
        let mut recorded = api.recorded.lock().unwrap();
        recorded.token_requests.push(recorded_request(&headers, query));
        recorded.token_requests.len()
    };

    if api.token_status != StatusCode::OK {
        return (api.token_status, r#"{"error":"invalid_grant"}"#).into_response();
    }

    Json(json!({
        "access_token": format!("access-{n}"),
        "token_type": "Bearer",
        "refresh_token": "rotated-but-ignored",
        "expires_in": api.expires_in,
        "scope": "smartWrite",
    }))
    .into_response()
}

async fn status(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    api.recorded
        .lock()
        .unwrap()
        .status_requests
        .push(recorded_request(&headers, query));
    Json(api.status_body.clone()).into_response()
}

async fn command(
    State(api): State<Arc<FakeApi>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    {
        let mut recorded = api.recorded.lock().unwrap();
        recorded.command_requests.push(recorded_request(&headers, query));
        recorded.command_bodies.push(body);
    }
    (api.command_status, Json(api.command_body.clone())).into_response()
}

// ---------------------------------------------------------------------------
// Canned payloads
// ---------------------------------------------------------------------------

pub fn air_data(co2: i64, voc: i64, pm25: i64) -> Value {
    json!({
        "timestamp": "2024-01-15T19:30:00.000Z",
        "score": 87.0,
        "dew_point": 9.35,
        "temp": 21.4,
        "humid": 45.12,
        "co2": co2,
        "voc": voc,
        "voc_baseline": 37_933,
        "voc_h2_raw": 25,
        "voc_ethanol_raw": 38,
        "pm25": pm25,
        "pm10_est": pm25 + 2,
    })
}

pub fn thermostat(equipment_status: &str) -> Value {
    json!({
        "identifier": "318324702718",
        "name": "Main Floor",
        "thermostatTime": "2024-01-15 14:30:00",
        "equipmentStatus": equipment_status,
        "runtime": {
            "actualTemperature": 705,
            "actualHumidity": 41,
            "desiredHeat": 680,
            "desiredCool": 760,
            "desiredHumidity": 36,
            "desiredDehumidity": 60,
            "desiredFanMode": "auto",
        },
    })
}

pub fn thermostat_list(thermostats: &[Value]) -> Value {
    json!({
        "page": { "page": 1, "totalPages": 1, "pageSize": thermostats.len(), "total": thermostats.len() },
        "thermostatList": thermostats,
        "status": { "code": 0, "message": "" },
    })
}
