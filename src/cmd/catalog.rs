/*!
`catalog.rs`

Implements the `commands` subcommand: lists every command name the adapter
answers to, with its accepted arguments (required ones marked `*`).

JSON Output Shape:
{
  "count": 11,
  "commands": [
    { "name": "lifx-activate-scene",
      "arguments": ["scene_uuid", "duration", "fast"],
      "required": ["scene_uuid"],
      "description": "..." }
  ]
}
*/

use anyhow::Result;
use clap::Args;
use serde_json::{Value, json};

use crate::cmd::command::Command;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji, table};

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Only show commands whose name contains TEXT (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    pub filter: Option<String>,
}

pub fn execute_catalog(args: CatalogArgs, json: bool) -> Result<()> {
    let commands = matching(args.filter.as_deref());

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog_json(&commands))?);
        return Ok(());
    }

    let style = StyleOptions::detect();
    println!("{}", render(&commands, args.filter.as_deref(), &style));
    Ok(())
}

fn matching(filter: Option<&str>) -> Vec<Command> {
    let needle = filter
        .map(|f| f.trim().to_ascii_lowercase())
        .filter(|f| !f.is_empty());
    Command::variants()
        .iter()
        .copied()
        .filter(|c| needle.as_deref().is_none_or(|n| c.name().contains(n)))
        .collect()
}

fn catalog_json(commands: &[Command]) -> Value {
    let items: Vec<Value> = commands
        .iter()
        .map(|c| {
            let arguments: Vec<&str> = c
                .arguments()
                .iter()
                .map(|a| a.trim_end_matches('*'))
                .collect();
            let required: Vec<&str> = c
                .arguments()
                .iter()
                .filter_map(|a| a.strip_suffix('*'))
                .collect();
            json!({
                "name": c.name(),
                "arguments": arguments,
                "required": required,
                "description": c.description(),
            })
        })
        .collect();
    json!({ "count": items.len(), "commands": items })
}

fn render(commands: &[Command], filter: Option<&str>, style: &StyleOptions) -> String {
    let title = format!("{} Commands ({})", emoji("list", style), commands.len());
    let header = box_header(
        title.trim_start(),
        filter.map(|f| format!("filter={f}")),
        style,
    );

    if commands.is_empty() {
        let none = format!("{} (none)", emoji("info", style));
        return format!("{header}\n{}", color(Role::Dim, none.trim_start(), style));
    }

    let rows: Vec<Vec<String>> = commands
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            let args = if c.arguments().is_empty() {
                "-".to_string()
            } else {
                c.arguments().join(", ")
            };
            vec![
                (idx + 1).to_string(),
                c.name().to_string(),
                args,
                c.description().to_string(),
            ]
        })
        .collect();

    let hint = format!(
        "{} {}",
        emoji("bulb", style),
        color(
            Role::Dim,
            "Run one with `lifx-adapter run <COMMAND> --arg key=value` (* = required)",
            style
        )
    );
    format!(
        "{header}\n{}\n\n{}",
        table(&["#", "COMMAND", "ARGUMENTS", "DESCRIPTION"], &rows, style),
        hint.trim_start()
    )
}
