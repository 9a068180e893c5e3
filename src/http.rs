use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::TransportError;

/// Sent on every outgoing request.
pub const USER_AGENT: &str = "AwairFan 1.0";

/// Build the HTTP client shared by the sensor and thermostat clients.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Send `request` once and return the body of a 2xx response.
///
/// Anything outside 200..=299 becomes `TransportError::HttpStatus`, carrying
/// whatever body the remote sent back so the failure can be diagnosed.
pub async fn send(request: RequestBuilder, url: &str) -> Result<Vec<u8>, TransportError> {
    let network = |source| TransportError::Network {
        url: url.to_owned(),
        source,
    };

    let response = request.send().await.map_err(network)?;
    let status = response.status();
    debug!(url = %url, status = status.as_u16(), "Response received");

    if !status.is_success() {
        // An unreadable body is reported as empty.
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::HttpStatus {
            url: url.to_owned(),
            status,
            body,
        });
    }

    let bytes = response.bytes().await.map_err(network)?;
    Ok(bytes.to_vec())
}

/// Decode a JSON body, tagging failures with the URL it came from.
pub fn decode<T: DeserializeOwned>(url: &str, bytes: &[u8]) -> Result<T, TransportError> {
    serde_json::from_slice(bytes).map_err(|source| TransportError::Decode {
        url: url.to_owned(),
        source,
    })
}

/// `send` followed by `decode`.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    url: &str,
) -> Result<T, TransportError> {
    let bytes = send(request, url).await?;
    decode(url, &bytes)
}

/// Parse `url` and append `params` as an encoded query string.
pub fn with_params(url: &str, params: &[(&str, &str)]) -> Result<Url, TransportError> {
    Url::parse_with_params(url, params).map_err(|e| TransportError::InvalidUrl {
        url: url.to_owned(),
        reason: e.to_string(),
    })
}

/// Join an API base URL and an endpoint path with exactly one `/` between them.
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::get, Router};
    use serde::Deserialize;

    use super::*;
    use crate::test_support::serve;

    #[derive(Debug, Deserialize)]
    struct Pong {
        pong: bool,
    }

    fn client() -> Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn join_normalises_slashes() {
        assert_eq!(join("https://api.ecobee.com/", "token"), "https://api.ecobee.com/token");
        assert_eq!(join("https://api.ecobee.com", "/1/thermostat"), "https://api.ecobee.com/1/thermostat");
        assert_eq!(join("http://h:1/base/", "1/thermostat"), "http://h:1/base/1/thermostat");
    }

    #[test]
    fn with_params_encodes_values() {
        let url = with_params(
            "http://h/1/thermostat",
            &[("format", "json"), ("body", r#"{"a":"b c"}"#)],
        )
        .unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("format".to_owned(), "json".to_owned()),
                ("body".to_owned(), r#"{"a":"b c"}"#.to_owned()),
            ]
        );
    }

    #[test]
    fn with_params_rejects_relative_url() {
        let err = with_params("not a url", &[]).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn decode_reports_url_on_schema_mismatch() {
        let err = decode::<Pong>("http://x/y", br#"{"ping":1}"#).unwrap_err();
        match err {
            TransportError::Decode { url, .. } => assert_eq!(url, "http://x/y"),
            other => panic!("expected Decode, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_json_decodes_success_body() {
        let router = Router::new().route("/ping", get(|| async { r#"{"pong":true}"# }));
        let base = serve(router).await;
        let url = join(&base, "ping");

        let pong: Pong = fetch_json(client().get(&url), &url).await.unwrap();
        assert!(pong.pong);
    }

    #[tokio::test]
    async fn non_success_status_keeps_body() {
        let router = Router::new().route(
            "/fail",
            get(|| async { (StatusCode::FORBIDDEN, "nope") }),
        );
        let base = serve(router).await;
        let url = join(&base, "fail");

        let err = send(client().get(&url), &url).await.unwrap_err();
        match err {
            TransportError::HttpStatus { status, body, .. } => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(body, "nope");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn user_agent_is_sent() {
        let router = Router::new().route(
            "/ua",
            get(|headers: axum::http::HeaderMap| async move {
                headers
                    .get("user-agent")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_owned()
            }),
        );
        let base = serve(router).await;
        let url = join(&base, "ua");

        let body = send(client().get(&url), &url).await.unwrap();
        assert_eq!(body, USER_AGENT.as_bytes());
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{addr}/");

        let err = send(client().get(&url), &url).await.unwrap_err();
        assert!(matches!(err, TransportError::Network { .. }));
    }
}
