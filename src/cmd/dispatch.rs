/*!
`dispatch.rs`

Routes one invocation to its handler and guarantees exactly one artifact:
  - unknown command name      -> error "Command <name> is not implemented."
                                 (names match exactly; <name> is echoed as sent)
  - handler returned Err(e)   -> error "Failed to execute <name>. Error: <e>"
  - handler returned Ok(a)    -> a (note, or the handler's own validation error)

`route` is the client-agnostic core; `dispatch` builds the real client and a
Tokio runtime around it (main stays synchronous).
*/

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cmd::command::Command;
use crate::cmd::entry::Artifact;
use crate::cmd::shared::ArgMap;
use crate::cmd::{diagnostics, effects, lights, scenes};
use crate::lifx::{Config, LifxApi, LifxClient};

/// Everything one command execution needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: String,
    pub args: ArgMap,
    pub config: Config,
}

/// Host-provided invocation document: `{"command", "args", "params"}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostInvocation {
    pub command: String,
    #[serde(default)]
    pub args: ArgMap,
    /// Connection settings (`url`, `api_token`, `insecure`, `proxy`)
    #[serde(default)]
    pub params: ArgMap,
}

/// Execute an invocation; never fails, always one artifact.
pub fn dispatch(invocation: &Invocation) -> Artifact {
    let name = invocation.command.as_str();
    let Some(command) = Command::from_name(name) else {
        tracing::warn!(command = name, "unknown command");
        return Artifact::error(format!("Command {name} is not implemented."));
    };

    tracing::debug!(%command, args = invocation.args.len(), "dispatching");
    match execute(command, invocation) {
        Ok(artifact) => artifact,
        Err(e) => {
            let reason = e.to_string();
            tracing::error!(%command, error = %reason, "command failed");
            Artifact::error(format!("Failed to execute {command}. Error: {reason}"))
        }
    }
}

fn execute(command: Command, invocation: &Invocation) -> Result<Artifact> {
    let client = LifxClient::new(&invocation.config)?;
    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(route(&client, command, &invocation.args))
}

/// Invoke the handler for `command`.
pub async fn route<C: LifxApi>(client: &C, command: Command, args: &ArgMap) -> Result<Artifact> {
    match command {
        Command::TestModule => diagnostics::test_module(client, args).await,
        Command::ListLights => lights::list_lights(client, args).await,
        Command::SetState => lights::set_state(client, args).await,
        Command::TogglePower => lights::toggle_power(client, args).await,
        Command::BreatheEffect => effects::breathe_effect(client, args).await,
        Command::PulseEffect => effects::pulse_effect(client, args).await,
        Command::ListScenes => scenes::list_scenes(client, args).await,
        Command::ActivateScene => scenes::activate_scene(client, args).await,
        Command::AlertFlash => effects::alert_flash(client, args).await,
        Command::TestConnection => diagnostics::test_connection(client, args).await,
        Command::HealthCheck => diagnostics::health_check(client, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::testing::MockLifx;
    use crate::lifx::client::tests::{closed_base_url, http_response, serve_once};
    use serde_json::json;

    fn invocation(command: &str, base_url: &str) -> Invocation {
        Invocation {
            command: command.to_string(),
            args: ArgMap::new(),
            config: Config {
                base_url: base_url.to_string(),
                api_token: "t".into(),
                ..Config::default()
            },
        }
    }

    #[test]
    fn unknown_command_is_error_artifact() {
        let artifact = dispatch(&invocation("lifx-disco", "https://api.lifx.com/v1"));
        assert_eq!(
            artifact,
            Artifact::error("Command lifx-disco is not implemented.")
        );
    }

    #[test]
    fn command_names_match_exactly() {
        let artifact = dispatch(&invocation("Test-Module", "https://api.lifx.com/v1"));
        assert_eq!(
            artifact,
            Artifact::error("Command Test-Module is not implemented.")
        );
        let artifact = dispatch(&invocation(" test-module", "https://api.lifx.com/v1"));
        assert_eq!(
            artifact,
            Artifact::error("Command  test-module is not implemented.")
        );
    }

    #[test]
    fn encoded_selector_reaches_the_right_resource() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (base, server) = rt.block_on(serve_once(http_response("200 OK", &[], "[]")));
        let mut inv = invocation("lifx-list-lights", &base);
        inv.args = ArgMap::new().with("selector", "label:Room #1");

        let artifact = dispatch(&inv);
        assert!(!artifact.is_error());
        let request = rt.block_on(server).unwrap();
        assert!(request.starts_with("GET /v1/lights/label:Room%20%231 HTTP/1.1"));
    }

    #[test]
    fn bad_config_is_wrapped() {
        let artifact = dispatch(&invocation("lifx-list-lights", "::nope::"));
        let msg = artifact.human_readable();
        assert!(artifact.is_error());
        assert!(
            msg.starts_with("Failed to execute lifx-list-lights. Error: invalid base URL '::nope::'"),
            "{msg}"
        );
    }

    #[test]
    fn remote_failure_is_wrapped() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let base = rt.block_on(closed_base_url());
        let artifact = dispatch(&invocation("test-module", &base));
        assert!(artifact.is_error());
        assert!(
            artifact
                .human_readable()
                .starts_with("Failed to execute test-module. Error: request to ")
        );
    }

    #[test]
    fn probe_survives_network_failure() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let base = rt.block_on(closed_base_url());
        let artifact = dispatch(&invocation("lifx-test-connection", &base));
        assert!(!artifact.is_error());
    }

    #[test]
    fn end_to_end_list_lights() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (base, server) = rt.block_on(serve_once(http_response(
            "200 OK",
            &[],
            r#"{"id":"d073d5000001","label":"Desk"}"#,
        )));
        let mut inv = invocation("lifx-list-lights", &base);
        inv.args = ArgMap::new().with("selector", "label:Desk");

        let artifact = dispatch(&inv);
        assert_eq!(
            artifact.context("LIFX.Light"),
            Some(&json!([{"id":"d073d5000001","label":"Desk"}]))
        );
        let request = rt.block_on(server).unwrap();
        assert!(request.starts_with("GET /v1/lights/label:Desk HTTP/1.1"));
    }

    #[tokio::test]
    async fn validation_errors_pass_through_route() {
        let mock = MockLifx::new();
        let artifact = route(&mock, Command::ActivateScene, &ArgMap::new())
            .await
            .unwrap();
        assert!(artifact.is_error());
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn every_command_routes_to_one_call() {
        let args = ArgMap::new()
            .with("color", "red")
            .with("power", "on")
            .with("scene_uuid", "abc");
        for command in Command::variants() {
            let mock = MockLifx::new();
            let artifact = route(&mock, *command, &args).await.unwrap();
            assert!(!artifact.is_error(), "{command}");
            assert_eq!(mock.calls().len(), 1, "{command}");
        }
    }

    #[test]
    fn host_invocation_parses() {
        let raw = json!({
            "command": "lifx-alert-flash",
            "args": {"severity": "high", "cycles": 3},
            "params": {"url": "https://api.lifx.com/v1", "insecure": false}
        });
        let inv: HostInvocation = serde_json::from_value(raw).unwrap();
        assert_eq!(inv.command, "lifx-alert-flash");
        assert_eq!(inv.args.get("cycles"), Some("3"));
        assert_eq!(inv.params.get("insecure"), Some("false"));

        let bare: HostInvocation = serde_json::from_value(json!({"command": "test-module"})).unwrap();
        assert!(bare.args.is_empty());
    }
}
