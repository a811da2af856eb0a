/*!
shared.rs - argument handling shared by every command handler.

Focus:
  - ArgMap: host argument mapping (string key -> optional string value)
  - bool_arg / Severity::normalize / severity_defaults: loose-input normalizers
  - Payload: request body builder that only carries explicitly supplied fields
  - argument files (JSON / YAML) merged under CLI pairs

Blank values count as absent everywhere: the host sends "" for fields the
operator left empty.
*/

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/* ---- Argument Mapping ---- */

/// Flat argument mapping handed over by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgMap {
    values: BTreeMap<String, Option<String>>,
}

impl ArgMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.values.insert(key.into(), value);
    }

    /// Builder-style insert.
    #[cfg(test)]
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.insert(key, Some(value.to_string()));
        self
    }

    /// Trimmed value, `None` when absent, null or blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Target selector, `all` when not supplied.
    pub fn selector(&self) -> &str {
        self.get("selector").unwrap_or("all")
    }

    /// Boolean argument; `None` means the caller did not decide.
    pub fn flag(&self, key: &str) -> Option<bool> {
        bool_arg(self.get(key))
    }

    /// Numeric argument, always as a float.
    pub fn float(&self, key: &str) -> Result<Option<f64>> {
        self.get(key).map(|raw| parse_float(key, raw)).transpose()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add entries from `other` whose keys are not already present.
    pub fn merge_missing(&mut self, other: ArgMap) {
        for (k, v) in other.values {
            self.values.entry(k).or_insert(v);
        }
    }

    /// Parse repeated `KEY=VALUE` pairs.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut map = Self::new();
        for kv in pairs {
            let kv = kv.as_ref();
            let Some((k, v)) = kv.split_once('=') else {
                bail!("invalid --arg (expected KEY=VALUE): {kv}");
            };
            let key = k.trim();
            if key.is_empty() {
                bail!("invalid --arg (empty key): {kv}");
            }
            map.insert(key, Some(v.trim().to_string()));
        }
        Ok(map)
    }

    /// Convert a JSON object: strings kept, null = absent, other scalars stringified.
    pub fn from_json_object(obj: &Map<String, Value>) -> Self {
        let mut map = Self::new();
        for (k, v) in obj {
            let s = match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            };
            map.insert(k.clone(), s);
        }
        map
    }

    /// Load an argument file (JSON, or YAML when the extension says so).
    pub fn load_file(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read argument file: {path}"))?;
        let value = parse_document(path, &raw)?;
        let obj = value
            .as_object()
            .ok_or_else(|| anyhow::anyhow!("argument file root must be an object: {path}"))?;
        Ok(Self::from_json_object(obj))
    }
}

impl<'de> Deserialize<'de> for ArgMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let obj = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(obj.map(|o| Self::from_json_object(&o)).unwrap_or_default())
    }
}

/// Parse a JSON or YAML document into JSON, choosing by file extension.
pub fn parse_document(path: &str, raw: &str) -> Result<Value> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".yaml") || lower.ends_with(".yml") {
        let yaml_v: serde_yaml::Value =
            serde_yaml::from_str(raw).context("failed to parse YAML document")?;
        serde_json::to_value(yaml_v).context("failed to convert YAML to JSON")
    } else {
        serde_json::from_str(raw).context("failed to parse JSON document")
    }
}

fn parse_float(key: &str, raw: &str) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => bail!("invalid numeric value for '{key}': '{raw}'"),
    }
}

/* ---- Normalizers ---- */

/// Loose boolean: true/yes/y/1 and false/no/n/0, case-insensitive.
pub fn bool_arg(raw: Option<&str>) -> Option<bool> {
    let l = raw?.trim().to_ascii_lowercase();
    match l.as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Alert severity levels accepted by `lifx-alert-flash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Accepts names and numeric levels 1-4; `None` when unrecognized.
    pub fn normalize(raw: Option<&str>) -> Option<Self> {
        let l = raw?.trim().to_ascii_lowercase();
        match l.as_str() {
            "1" | "low" => Some(Severity::Low),
            "2" | "medium" | "moderate" => Some(Severity::Medium),
            "3" | "high" => Some(Severity::High),
            "4" | "critical" | "crit" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flash color and cycle count for a severity; unspecified flashes red five times.
pub fn severity_defaults(severity: Option<Severity>) -> (&'static str, u32) {
    match severity {
        Some(Severity::Low) => ("green", 3),
        Some(Severity::Medium) => ("yellow", 5),
        Some(Severity::High) => ("orange", 7),
        Some(Severity::Critical) => ("red", 10),
        None => ("red", 5),
    }
}

/* ---- Request Payloads ---- */

/// JSON request body that only contains fields the caller supplied.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Copy a string argument through when present.
    pub fn text(&mut self, args: &ArgMap, key: &str) {
        if let Some(v) = args.get(key) {
            self.set(key, v);
        }
    }

    /// Copy a numeric argument through (as float) when present.
    pub fn number(&mut self, args: &ArgMap, key: &str) -> Result<()> {
        if let Some(n) = args.float(key)? {
            self.set(key, n);
        }
        Ok(())
    }

    /// Copy a boolean argument through when it resolves to true/false.
    pub fn flag(&mut self, args: &ArgMap, key: &str) {
        if let Some(b) = args.flag(key) {
            self.set(key, b);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }
}

/* ---- Tests ---- */
