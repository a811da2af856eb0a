/*!
`lights.rs`

Light commands:
  - lifx-list-lights   GET  /lights/{selector}         -> LIFX.Light (list)
  - lifx-set-state     PUT  /lights/{selector}/state   -> LIFX.State
  - lifx-toggle-power  POST /lights/{selector}/toggle  -> LIFX.Toggle

Request bodies only carry arguments the caller actually supplied.
*/

use anyhow::Result;
use serde_json::Value;

use crate::cmd::entry::Artifact;
use crate::cmd::format::{json_block, markdown_table, or_dash};
use crate::cmd::shared::{ArgMap, Payload};
use crate::lifx::LifxApi;
use crate::lifx::model::{Light, action_results, into_list, lenient};

pub async fn list_lights<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let selector = args.selector();
    let lights = into_list(client.list_lights(selector).await?);
    tracing::info!(selector, count = lights.len(), "listed lights");

    let human = format!(
        "### LIFX Lights (selector=\"{selector}\")\n{}",
        lights_table(&lights)
    );
    Ok(Artifact::note(human, "LIFX.Light", Value::Array(lights)))
}

pub async fn set_state<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let selector = args.selector();
    let mut payload = Payload::new();
    payload.text(args, "power");
    payload.text(args, "color");
    for field in ["brightness", "duration", "infrared"] {
        payload.number(args, field)?;
    }
    payload.flag(args, "fast");

    if payload.is_empty() {
        return Ok(Artifact::error("No state fields were provided."));
    }

    let result = client.set_state(selector, payload.as_map()).await?;
    let human = action_report(&format!("LIFX Set State (selector=\"{selector}\")"), &result);
    Ok(Artifact::note(human, "LIFX.State", result))
}

pub async fn toggle_power<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let selector = args.selector();
    let mut payload = Payload::new();
    payload.number(args, "duration")?;

    let result = client.toggle_power(selector, payload.as_map()).await?;
    let human = action_report(&format!("LIFX Toggle Power (selector=\"{selector}\")"), &result);
    Ok(Artifact::note(human, "LIFX.Toggle", result))
}

fn lights_table(lights: &[Value]) -> String {
    let rows: Vec<Vec<String>> = lights
        .iter()
        .map(|v| {
            let light: Light = lenient(v);
            vec![
                or_dash(light.label.as_deref()),
                or_dash(light.id.as_deref()),
                or_dash(light.power.as_deref()),
                light
                    .connected
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".into()),
                light
                    .brightness
                    .map(|b| format!("{:.0}%", b * 100.0))
                    .unwrap_or_else(|| "-".into()),
                light
                    .color
                    .map(|c| c.summary())
                    .unwrap_or_else(|| "-".into()),
                or_dash(light.group.and_then(|g| g.name).as_deref()),
                or_dash(light.location.and_then(|l| l.name).as_deref()),
            ]
        })
        .collect();
    markdown_table(
        &[
            "Label",
            "ID",
            "Power",
            "Connected",
            "Brightness",
            "Color",
            "Group",
            "Location",
        ],
        &rows,
    )
}

/// Results table for state / effect responses, fenced JSON for anything else.
pub(crate) fn action_report(title: &str, result: &Value) -> String {
    match action_results(result) {
        Some(results) => {
            let rows: Vec<Vec<String>> = results
                .into_iter()
                .map(|r| {
                    vec![
                        or_dash(r.id.as_deref()),
                        or_dash(r.label.as_deref()),
                        or_dash(r.status.as_deref()),
                    ]
                })
                .collect();
            format!(
                "### {title}\n{}",
                markdown_table(&["ID", "Label", "Status"], &rows)
            )
        }
        None => json_block(title, result),
    }
}
