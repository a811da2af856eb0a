//! In-memory `LifxApi` double for handler tests. Records every call.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value, json};
use std::sync::Mutex;

use crate::lifx::client::ApiError;
use crate::lifx::{LifxApi, RawResponse};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub op: &'static str,
    pub target: String,
    pub payload: Option<Value>,
}

pub(crate) struct MockLifx {
    calls: Mutex<Vec<Call>>,
    response: Value,
    raw: RawResponse,
    failure: Option<(u16, String)>,
}

impl MockLifx {
    pub fn new() -> Self {
        Self::responding(json!([]))
    }

    /// JSON endpoints answer with `value`.
    pub fn responding(value: Value) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            response: value,
            raw: RawResponse {
                status: 200,
                headers: HeaderMap::new(),
                body: "[]".into(),
            },
            failure: None,
        }
    }

    /// Raw endpoints answer with this status / headers / body.
    pub fn raw(status: u16, headers: &[(&'static str, &str)], body: &str) -> Self {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(
                HeaderName::from_static(k),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        let mut mock = Self::new();
        mock.raw = RawResponse {
            status,
            headers: map,
            body: body.to_string(),
        };
        mock
    }

    /// Every endpoint fails with `ApiError::Status`.
    pub fn failing(status: u16, body: &str) -> Self {
        let mut mock = Self::new();
        mock.failure = Some((status, body.to_string()));
        mock
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_payload(&self) -> Value {
        self.calls()
            .last()
            .and_then(|c| c.payload.clone())
            .expect("no call with payload recorded")
    }

    fn record(
        &self,
        op: &'static str,
        target: &str,
        payload: Option<&Map<String, Value>>,
    ) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call {
            op,
            target: target.to_string(),
            payload: payload.map(|p| Value::Object(p.clone())),
        });
        match &self.failure {
            Some((status, body)) => Err(ApiError::Status {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl LifxApi for MockLifx {
    fn base_url(&self) -> &str {
        "https://api.lifx.test/v1"
    }

    fn verify_tls(&self) -> bool {
        true
    }

    async fn list_lights(&self, selector: &str) -> Result<Value, ApiError> {
        self.record("list_lights", selector, None)?;
        Ok(self.response.clone())
    }

    async fn list_lights_raw(&self, selector: &str) -> Result<RawResponse, ApiError> {
        self.record("list_lights_raw", selector, None)?;
        Ok(self.raw.clone())
    }

    async fn set_state(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.record("set_state", selector, Some(payload))?;
        Ok(self.response.clone())
    }

    async fn toggle_power(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.record("toggle_power", selector, Some(payload))?;
        Ok(self.response.clone())
    }

    async fn breathe_effect(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.record("breathe_effect", selector, Some(payload))?;
        Ok(self.response.clone())
    }

    async fn pulse_effect(
        &self,
        selector: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, ApiError> {
        self.record("pulse_effect", selector, Some(payload))?;
        Ok(self.response.clone())
    }

    async fn list_scenes(&self) -> Result<Value, ApiError> {
        self.record("list_scenes", "", None)?;
        Ok(self.response.clone())
    }

    async fn activate_scene(
        &self,
        scene_uuid: &str,
        payload: &Map<String, Value>,
    ) -> Result<RawResponse, ApiError> {
        self.record("activate_scene", scene_uuid, Some(payload))?;
        Ok(self.raw.clone())
    }
}
