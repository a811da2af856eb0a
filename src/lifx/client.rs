//! HTTP client for the LIFX cloud API.
//!
//! One request per call, no retries. Status >= 400 becomes `ApiError::Status`;
//! successful bodies are decoded as JSON, falling back to the raw text.
//! Raw-mode calls skip both steps and hand back status, headers and body.

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use super::Config;

/// Failure modes of a LIFX API call.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("API token cannot be used in an Authorization header")]
    InvalidToken,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("LIFX API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Undecoded response, for callers that need the status code or headers.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// Status in [200, 400).
    pub fn is_ok(&self) -> bool {
        (200..400).contains(&self.status)
    }

    /// First header present among `names`, as text.
    pub fn header(&self, names: &[&str]) -> Option<String> {
        names.iter().find_map(|name| {
            self.headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
    }

    /// Body as JSON, or the raw text as a JSON string when it does not parse.
    pub fn decode(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

/// Operations the command handlers need from the LIFX API.
#[allow(async_fn_in_trait)]
pub trait LifxApi {
    /// Normalized API root.
    fn base_url(&self) -> &str;

    /// Whether TLS certificates are verified.
    fn verify_tls(&self) -> bool;

    async fn list_lights(&self, selector: &str) -> Result<Value, ApiError>;

    /// Same request as `list_lights`, without status check or decoding.
    async fn list_lights_raw(&self, selector: &str) -> Result<RawResponse, ApiError>;

    async fn set_state(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError>;

    async fn toggle_power(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError>;

    async fn breathe_effect(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError>;

    async fn pulse_effect(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError>;

    async fn list_scenes(&self) -> Result<Value, ApiError>;

    /// Raw: the caller reports the HTTP status itself.
    async fn activate_scene(
        &self,
        scene_uuid: &str,
        payload: &Map<String, Value>,
    ) -> Result<RawResponse, ApiError>;
}

/// reqwest-backed `LifxApi` implementation.
#[derive(Debug, Clone)]
pub struct LifxClient {
    http: reqwest::Client,
    base: Url,
    base_url: String,
    verify: bool,
}

impl LifxClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|e| ApiError::InvalidUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl {
                url: base_url,
                reason: "URL cannot carry a path".into(),
            });
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_token.trim()))
            .map_err(|_| ApiError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(config.insecure);
        if !config.proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().map_err(ApiError::Client)?;

        tracing::debug!(
            base_url = %base_url,
            verify_tls = config.verify_tls(),
            proxy = config.proxy,
            "LIFX client configured"
        );

        Ok(Self {
            http,
            base,
            base_url,
            verify: config.verify_tls(),
        })
    }

    /// Base URL plus one percent-encoded path segment per entry.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // `new` rejects cannot-be-a-base URLs
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send_raw(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Map<String, Value>>,
    ) -> Result<RawResponse, ApiError> {
        let url = self.endpoint(segments);
        tracing::debug!(%method, %url, "sending LIFX request");

        let mut request = self.http.request(method, url.clone());
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        tracing::debug!(status, bytes = body.len(), "LIFX response received");
        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Map<String, Value>>,
    ) -> Result<Value, ApiError> {
        let raw = self.send_raw(method, segments, body).await?;
        if raw.status >= 400 {
            return Err(ApiError::Status {
                status: raw.status,
                body: raw.body,
            });
        }
        Ok(raw.decode())
    }
}

/// Selector path segment; blank means every light.
fn selector_or_all(selector: &str) -> &str {
    match selector.trim() {
        "" => "all",
        s => s,
    }
}

impl LifxApi for LifxClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn verify_tls(&self) -> bool {
        self.verify
    }

    async fn list_lights(&self, selector: &str) -> Result<Value, ApiError> {
        self.send(Method::GET, &["lights", selector_or_all(selector)], None)
            .await
    }

    async fn list_lights_raw(&self, selector: &str) -> Result<RawResponse, ApiError> {
        self.send_raw(Method::GET, &["lights", selector_or_all(selector)], None)
            .await
    }

    async fn set_state(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let path = ["lights", selector_or_all(selector), "state"];
        self.send(Method::PUT, &path, Some(payload)).await
    }

    async fn toggle_power(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let path = ["lights", selector_or_all(selector), "toggle"];
        self.send(Method::POST, &path, Some(payload)).await
    }

    async fn breathe_effect(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let path = ["lights", selector_or_all(selector), "effects", "breathe"];
        self.send(Method::POST, &path, Some(payload)).await
    }

    async fn pulse_effect(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        let path = ["lights", selector_or_all(selector), "effects", "pulse"];
        self.send(Method::POST, &path, Some(payload)).await
    }

    async fn list_scenes(&self) -> Result<Value, ApiError> {
        self.send(Method::GET, &["scenes"], None).await
    }

    async fn activate_scene(
        &self,
        scene_uuid: &str,
        payload: &Map<String, Value>,
    ) -> Result<RawResponse, ApiError> {
        let scene = format!("scene_id:{}", scene_uuid.trim());
        self.send_raw(Method::PUT, &["scenes", &scene, "activate"], Some(payload))
            .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    pub(crate) fn http_response(status: &str, headers: &[(&str, &str)], body: &str) -> String {
        let mut out = format!(
            "HTTP/1.1 {status}\r\nContent-Length: {}\r\nConnection: close\r\n",
            body.len()
        );
        for (k, v) in headers {
            out.push_str(&format!("{k}: {v}\r\n"));
        }
        out.push_str("\r\n");
        out.push_str(body);
        out
    }

    async fn read_request(sock: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Loopback server answering exactly one request with `response`.
    /// Resolves to the raw request text.
    pub(crate) async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let request = read_request(&mut sock).await;
            sock.write_all(response.as_bytes()).await.unwrap();
            let _ = sock.shutdown().await;
            request
        });
        (format!("http://{addr}/v1/"), handle)
    }

    /// Base URL pointing at a loopback port nothing listens on.
    pub(crate) async fn closed_base_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}/v1")
    }

    fn client_for(base_url: &str) -> LifxClient {
        LifxClient::new(&Config {
            base_url: base_url.to_string(),
            api_token: "secret-token".into(),
            ..Config::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn list_lights_sends_bearer_and_decodes_json() {
        let body = r#"[{"id":"d073d5000001","label":"Desk"}]"#;
        let (base, server) = serve_once(http_response("200 OK", &[], body)).await;
        let client = client_for(&base);

        let value = client.list_lights("all").await.unwrap();
        assert_eq!(value, json!([{"id":"d073d5000001","label":"Desk"}]));

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /v1/lights/all HTTP/1.1"));
        let lower = request.to_ascii_lowercase();
        assert!(lower.contains("authorization: bearer secret-token"));
        assert!(lower.contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn empty_selector_means_all() {
        let (base, server) = serve_once(http_response("200 OK", &[], "[]")).await;
        client_for(&base).list_lights("  ").await.unwrap();
        assert!(server.await.unwrap().starts_with("GET /v1/lights/all "));
    }

    #[tokio::test]
    async fn selector_is_percent_encoded() {
        let (base, server) = serve_once(http_response("200 OK", &[], "[]")).await;
        client_for(&base)
            .list_lights("label:Room #1")
            .await
            .unwrap();
        assert!(
            server
                .await
                .unwrap()
                .starts_with("GET /v1/lights/label:Room%20%231 HTTP/1.1")
        );
    }

    #[tokio::test]
    async fn selector_cannot_escape_its_segment() {
        let (base, server) = serve_once(http_response("200 OK", &[], "{}")).await;
        let mut payload = Map::new();
        payload.insert("power".into(), json!("off"));
        client_for(&base)
            .set_state("id:a/b?c,group:x%y", &payload)
            .await
            .unwrap();
        assert!(
            server
                .await
                .unwrap()
                .starts_with("PUT /v1/lights/id:a%2Fb%3Fc,group:x%25y/state HTTP/1.1")
        );
    }

    #[tokio::test]
    async fn scene_uuid_is_percent_encoded() {
        let (base, server) = serve_once(http_response("207 Multi-Status", &[], "")).await;
        client_for(&base)
            .activate_scene("abc#1", &Map::new())
            .await
            .unwrap();
        assert!(
            server
                .await
                .unwrap()
                .starts_with("PUT /v1/scenes/scene_id:abc%231/activate HTTP/1.1")
        );
    }

    #[tokio::test]
    async fn error_status_is_typed() {
        let body = r#"{"error":"Invalid token"}"#;
        let (base, _server) = serve_once(http_response("401 Unauthorized", &[], body)).await;
        let err = client_for(&base).list_scenes().await.unwrap_err();
        match &err {
            ApiError::Status { status, body } => {
                assert_eq!(*status, 401);
                assert!(body.contains("Invalid token"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("LIFX API error 401:"));
    }

    #[tokio::test]
    async fn non_json_body_falls_back_to_text() {
        let (base, _server) = serve_once(http_response("207 Multi-Status", &[], "all good")).await;
        let value = client_for(&base).list_lights("all").await.unwrap();
        assert_eq!(value, json!("all good"));
    }

    #[tokio::test]
    async fn set_state_puts_json_payload() {
        let (base, server) =
            serve_once(http_response("207 Multi-Status", &[], r#"{"results":[]}"#)).await;
        let mut payload = Map::new();
        payload.insert("power".into(), json!("on"));
        payload.insert("brightness".into(), json!(0.5));
        client_for(&base)
            .set_state("group:Office", &payload)
            .await
            .unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("PUT /v1/lights/group:Office/state HTTP/1.1"));
        assert!(request.contains(r#""brightness":0.5"#));
        assert!(request.contains(r#""power":"on""#));
    }

    #[tokio::test]
    async fn activate_scene_keeps_error_status_raw() {
        let (base, server) = serve_once(http_response("404 Not Found", &[], "missing")).await;
        let raw = client_for(&base)
            .activate_scene("abc-123", &Map::new())
            .await
            .unwrap();
        assert_eq!(raw.status, 404);
        assert!(!raw.is_ok());
        assert_eq!(raw.body, "missing");
        assert!(
            server
                .await
                .unwrap()
                .starts_with("PUT /v1/scenes/scene_id:abc-123/activate HTTP/1.1")
        );
    }

    #[tokio::test]
    async fn raw_headers_are_exposed() {
        let headers = [("X-RateLimit-Limit", "120"), ("X-RateLimit-Remaining", "119")];
        let (base, _server) = serve_once(http_response("200 OK", &headers, "[]")).await;
        let raw = client_for(&base).list_lights_raw("all").await.unwrap();
        assert!(raw.is_ok());
        assert_eq!(raw.header(&["x-ratelimit-limit"]), Some("120".into()));
        assert_eq!(
            raw.header(&["ratelimit-remaining", "x-ratelimit-remaining"]),
            Some("119".into())
        );
        assert_eq!(raw.header(&["x-ratelimit-reset"]), None);
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let base = closed_base_url().await;
        let err = client_for(&base).list_lights("all").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }), "got {err:?}");
    }

    #[test]
    fn invalid_base_url_rejected() {
        let err = LifxClient::new(&Config {
            base_url: "not a url".into(),
            ..Config::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let client = client_for("https://api.lifx.com/v1///");
        assert_eq!(client.base_url(), "https://api.lifx.com/v1");
        assert!(client.verify_tls());
    }
}
