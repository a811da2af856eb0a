//! Lenient views over LIFX JSON payloads.
//!
//! These are only used to render reports. Context output always carries the
//! untouched JSON returned by the API, so unknown fields are never lost.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A light as returned by `GET /lights/{selector}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Light {
    pub id: Option<String>,
    pub label: Option<String>,
    pub power: Option<String>,
    pub connected: Option<bool>,
    pub brightness: Option<f64>,
    pub color: Option<Hsbk>,
    pub group: Option<Named>,
    pub location: Option<Named>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Hsbk {
    pub hue: Option<f64>,
    pub saturation: Option<f64>,
    pub kelvin: Option<f64>,
}

/// Group / location reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Named {
    pub name: Option<String>,
}

/// A saved scene as returned by `GET /scenes`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub uuid: Option<String>,
    pub name: Option<String>,
    /// Epoch seconds; kept loose since it arrives as number or string.
    pub created_at: Option<Value>,
    pub updated_at: Option<Value>,
    pub states: Vec<SceneState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneState {
    pub selector: Option<String>,
}

/// One entry of the `results` array returned by state / effect calls.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionResult {
    pub id: Option<String>,
    pub label: Option<String>,
    pub status: Option<String>,
}

/// Decode a JSON value into `T`, falling back to `T::default()` on shape mismatch.
pub fn lenient<T: DeserializeOwned + Default>(value: &Value) -> T {
    match serde_json::from_value(value.clone()) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(error = %e, "unexpected LIFX payload shape");
            T::default()
        }
    }
}

/// List endpoints answer with a bare object when the selector matches one
/// resource; normalize that (and anything else) into a list.
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// `results` array of an action response, if it has one.
pub fn action_results(value: &Value) -> Option<Vec<ActionResult>> {
    value
        .get("results")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().map(lenient::<ActionResult>).collect())
}

/// Render an epoch field (number or string) as text for the timestamp formatter.
pub fn epoch_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Hsbk {
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(h) = self.hue {
            parts.push(format!("hue {h:.0}"));
        }
        if let Some(s) = self.saturation {
            parts.push(format!("sat {s:.2}"));
        }
        if let Some(k) = self.kelvin {
            parts.push(format!("{k:.0}K"));
        }
        if parts.is_empty() {
            "-".to_string()
        } else {
            parts.join(", ")
        }
    }
}
