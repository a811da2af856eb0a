/*!
`diagnostics.rs`

Probe commands:
  - test-module           list all lights; any failure propagates (host "Test" button)
  - lifx-test-connection  list lights; failures are reported as data   -> LIFX.ConnectionTest
  - lifx-health-check     raw list call; status + rate-limit headers   -> LIFX.HealthCheck

The two `lifx-*` probes always produce a note: a broken API shows up as
`Status: failed` / `Healthy: false` inside the payload.
*/

use anyhow::Result;
use serde_json::{Value, json};

use crate::cmd::entry::Artifact;
use crate::cmd::format::{cell, markdown_table, relative_time_now};
use crate::cmd::shared::ArgMap;
use crate::lifx::model::into_list;
use crate::lifx::{LifxApi, RawResponse};

/// Shown when the API does not send a rate-limit header.
const PLACEHOLDER: &str = "N/A";

const LIMIT_HEADERS: [&str; 3] = ["x-ratelimit-limit", "ratelimit-limit", "x-rate-limit-limit"];
const REMAINING_HEADERS: [&str; 3] = [
    "x-ratelimit-remaining",
    "ratelimit-remaining",
    "x-rate-limit-remaining",
];
const RESET_HEADERS: [&str; 3] = ["x-ratelimit-reset", "ratelimit-reset", "x-rate-limit-reset"];

pub async fn test_module<C: LifxApi>(client: &C, _args: &ArgMap) -> Result<Artifact> {
    client.list_lights("all").await?;
    Ok(Artifact::text("ok"))
}

pub async fn test_connection<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let selector = args.selector();
    let (lights, status, error) = match client.list_lights(selector).await {
        Ok(value) => (into_list(value), "success", String::new()),
        Err(e) => {
            tracing::warn!(selector, error = %e, "connection test failed");
            (Vec::new(), "failed", e.to_string())
        }
    };

    let info = json!({
        "BaseURL": client.base_url(),
        "SelectorTested": selector,
        "VerifySSL": client.verify_tls(),
        "Status": status,
        "LightsReturned": lights.len(),
        "Error": error,
    });

    let human = format!(
        "### LIFX Connection Test\n{}",
        field_table(
            &info,
            &[
                "Status",
                "BaseURL",
                "SelectorTested",
                "VerifySSL",
                "LightsReturned",
                "Error"
            ]
        )
    );
    Ok(Artifact::note(
        human,
        "LIFX.ConnectionTest",
        json!({ "Info": info, "Lights": lights }),
    ))
}

pub async fn health_check<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let selector = args.selector();
    let report = match client.list_lights_raw(selector).await {
        Ok(response) => HealthReport::from_response(&response),
        Err(e) => {
            tracing::warn!(selector, error = %e, "health check request failed");
            HealthReport::unreachable(e.to_string())
        }
    };

    let reset_at = if report.reset == PLACEHOLDER {
        PLACEHOLDER.to_string()
    } else {
        relative_time_now(Some(&report.reset))
    };

    let status = if report.healthy {
        "healthy"
    } else {
        "unhealthy"
    };
    let payload = json!({
        "Healthy": report.healthy,
        "Status": status,
        "StatusCode": report.status_code,
        "LightsReturned": report.lights_returned,
        "BaseURL": client.base_url(),
        "SelectorTested": selector,
        "RateLimit": {
            "Limit": report.limit,
            "Remaining": report.remaining,
            "Reset": report.reset,
            "ResetAt": reset_at,
        },
        "Error": report.error,
    });

    let mut rows = field_rows(
        &payload,
        &[
            "Status",
            "StatusCode",
            "LightsReturned",
            "BaseURL",
            "SelectorTested",
        ],
    );
    for (label, key) in [
        ("RateLimit.Limit", "Limit"),
        ("RateLimit.Remaining", "Remaining"),
        ("RateLimit.Reset", "ResetAt"),
    ] {
        rows.push(vec![label.to_string(), cell(payload["RateLimit"].get(key))]);
    }
    rows.push(vec!["Error".to_string(), cell(payload.get("Error"))]);

    let human = format!(
        "### LIFX Health Check\n{}",
        markdown_table(&["Field", "Value"], &rows)
    );
    Ok(Artifact::note(human, "LIFX.HealthCheck", payload))
}

/// Outcome of the health probe before rendering.
#[derive(Debug)]
struct HealthReport {
    healthy: bool,
    status_code: u16,
    lights_returned: usize,
    limit: String,
    remaining: String,
    reset: String,
    error: String,
}

impl HealthReport {
    fn from_response(response: &RawResponse) -> Self {
        let healthy = response.is_ok();

        // Body shape does not affect health; it only feeds the light count.
        let lights_returned = if healthy {
            match response.decode() {
                v @ (Value::Array(_) | Value::Object(_)) => into_list(v).len(),
                _ => 0,
            }
        } else {
            0
        };
        let error = if healthy {
            String::new()
        } else {
            format!("HTTP {}: {}", response.status, response.body.trim())
        };

        Self {
            healthy,
            status_code: response.status,
            lights_returned,
            limit: header_or_placeholder(response, &LIMIT_HEADERS),
            remaining: header_or_placeholder(response, &REMAINING_HEADERS),
            reset: header_or_placeholder(response, &RESET_HEADERS),
            error,
        }
    }

    fn unreachable(error: String) -> Self {
        Self {
            healthy: false,
            status_code: 0,
            lights_returned: 0,
            limit: PLACEHOLDER.to_string(),
            remaining: PLACEHOLDER.to_string(),
            reset: PLACEHOLDER.to_string(),
            error,
        }
    }
}

fn header_or_placeholder(response: &RawResponse, names: &[&str]) -> String {
    response
        .header(names)
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn field_rows(obj: &Value, keys: &[&str]) -> Vec<Vec<String>> {
    keys.iter()
        .map(|k| vec![k.to_string(), cell(obj.get(*k))])
        .collect()
}

fn field_table(obj: &Value, keys: &[&str]) -> String {
    markdown_table(&["Field", "Value"], &field_rows(obj, keys))
}
