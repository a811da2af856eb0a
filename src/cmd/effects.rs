/*!
`effects.rs`

Waveform effect commands:
  - lifx-breathe-effect  POST /lights/{selector}/effects/breathe -> LIFX.Breathe
  - lifx-pulse-effect    POST /lights/{selector}/effects/pulse   -> LIFX.Pulse
  - lifx-alert-flash     POST /lights/{selector}/effects/pulse   -> LIFX.AlertFlash

`color` is required for breathe / pulse and is checked before any request.
Alert flash always sends a complete body: severity supplies color and cycles,
explicit arguments override each independently.
*/

use anyhow::Result;

use crate::cmd::command::Command;
use crate::cmd::entry::Artifact;
use crate::cmd::lights::action_report;
use crate::cmd::shared::{ArgMap, Payload, Severity, severity_defaults};
use crate::lifx::LifxApi;

/// Pulse period (seconds) used by alert flash when none is given.
const ALERT_PERIOD: f64 = 0.7;

pub async fn breathe_effect<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let Some(payload) = effect_payload(Command::BreatheEffect, args)? else {
        return Ok(missing_color(Command::BreatheEffect));
    };
    let selector = args.selector();
    let result = client.breathe_effect(selector, payload.as_map()).await?;
    let human = action_report(
        &format!("LIFX Breathe Effect (selector=\"{selector}\")"),
        &result,
    );
    Ok(Artifact::note(human, "LIFX.Breathe", result))
}

pub async fn pulse_effect<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let Some(payload) = effect_payload(Command::PulseEffect, args)? else {
        return Ok(missing_color(Command::PulseEffect));
    };
    let selector = args.selector();
    let result = client.pulse_effect(selector, payload.as_map()).await?;
    let human = action_report(
        &format!("LIFX Pulse Effect (selector=\"{selector}\")"),
        &result,
    );
    Ok(Artifact::note(human, "LIFX.Pulse", result))
}

pub async fn alert_flash<C: LifxApi>(client: &C, args: &ArgMap) -> Result<Artifact> {
    let selector = args.selector();
    let severity_raw = args.get("severity");
    let severity = Severity::normalize(severity_raw);
    let (default_color, default_cycles) = severity_defaults(severity);

    let color = args.get("color").unwrap_or(default_color);
    let cycles = args.float("cycles")?.unwrap_or(f64::from(default_cycles));
    let period = args.float("period")?.unwrap_or(ALERT_PERIOD);
    let power_on = args.flag("power_on").unwrap_or(true);
    let persist = args.flag("persist").unwrap_or(false);

    let mut payload = Payload::new();
    payload.set("color", color);
    payload.set("cycles", cycles);
    payload.set("period", period);
    payload.set("power_on", power_on);
    payload.set("persist", persist);

    tracing::info!(
        selector,
        severity = severity.map(|s| s.as_str()).unwrap_or("unspecified"),
        color,
        cycles,
        "sending alert flash"
    );
    let result = client.pulse_effect(selector, payload.as_map()).await?;

    let human = format!(
        "LIFX alert flash executed for selector='{selector}', severity='{}', \
         color='{color}', cycles={cycles:?}, period={period:?}.",
        severity_raw.unwrap_or("-"),
    );
    Ok(Artifact::note(human, "LIFX.AlertFlash", result))
}

/// Shared breathe / pulse body; `None` when `color` is missing.
fn effect_payload(command: Command, args: &ArgMap) -> Result<Option<Payload>> {
    if !args.has("color") {
        return Ok(None);
    }
    let mut payload = Payload::new();
    payload.text(args, "color");
    payload.text(args, "from_color");
    payload.number(args, "period")?;
    payload.number(args, "cycles")?;
    if command == Command::BreatheEffect {
        payload.number(args, "peak")?;
    }
    payload.flag(args, "persist");
    payload.flag(args, "power_on");
    Ok(Some(payload))
}

fn missing_color(command: Command) -> Artifact {
    Artifact::error(format!("color argument is required for {command}"))
}
