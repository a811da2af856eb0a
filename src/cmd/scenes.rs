/*!
`scenes.rs`

Scene commands:
  - lifx-list-scenes     GET /scenes                          -> LIFX.Scene (list)
  - lifx-activate-scene  PUT /scenes/scene_id:{uuid}/activate -> LIFX.SceneActivation

Activation reports the HTTP status as returned, including error statuses.
*/

use anyhow::Result;
use serde_json::{Value, json};

use crate::cmd::entry::Artifact;
use crate::cmd::format::{markdown_table, or_dash, relative_time_now};
use crate::cmd::shared::{ArgMap, Payload};
use crate::lifx::LifxApi;
use crate::lifx::model::{Scene, epoch_text, into_list, lenient};

pub async fn list_scenes<C: LifxApi>(client: &C, _args: &ArgMap) -> Result<Artifact> {
    let scenes = into_list(client.list_scenes().await?);
    tracing::info!(count = scenes.len(), "listed scenes");

    let rows: Vec<Vec<String>> = scenes
        .iter()
        .map(|v| {
            let scene: Scene = lenient(v);
            let selectors: Vec<&str> = scene
                .states
                .iter()
                .filter_map(|s| s.selector.as_deref())
                .collect();
            vec![
                or_dash(scene.name.as_deref()),
                or_dash(scene.uuid.as_deref()),
                if selectors.is_empty() {
                    "-".to_string()
                } else {
                    selectors.join(", ")
                },
                relative_time_now(epoch_text(scene.created_at.as_ref()).as_deref()),
                relative_time_now(epoch_text(scene.updated_at.as_ref()).as_deref()),
            ]
        })
        .collect();

    let human = format!(
        "### LIFX Scenes\n{}",
        markdown_table(&["Name", "UUID", "Lights", "Created", "Updated"], &rows)
    );
    Ok(Artifact::note(human, "LIFX.Scene", Value::Array(scenes)))
}

pub async fn activate_scene<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let Some(scene_uuid) = args.get("scene_uuid") else {
        return Ok(Artifact::error(
            "scene_uuid argument is required for lifx-activate-scene",
        ));
    };

    let mut payload = Payload::new();
    payload.number(args, "duration")?;
    payload.flag(args, "fast");

    let response = client.activate_scene(scene_uuid, payload.as_map()).await?;
    if !response.is_ok() {
        tracing::warn!(scene_uuid, status = response.status, "scene activation rejected");
    }

    let human = format!(
        "LIFX scene {scene_uuid} activation returned HTTP {}.",
        response.status
    );
    Ok(Artifact::note(
        human,
        "LIFX.SceneActivation",
        json!({ "status": response.status }),
    ))
}
