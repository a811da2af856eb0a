/*!
Command enum: the fixed set of host command names.

Helpers:
  - variants()
  - from_name()   (exact match, as the host sends it)
  - name() / description() / arguments()
*/

use std::fmt;

/// Every command name the host may send.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Command {
    TestModule,
    ListLights,
    SetState,
    TogglePower,
    BreatheEffect,
    PulseEffect,
    ListScenes,
    ActivateScene,
    AlertFlash,
    TestConnection,
    HealthCheck,
}

impl Command {
    /// All commands, in help display order.
    pub const fn variants() -> &'static [Command] {
        &[
            Command::TestModule,
            Command::ListLights,
            Command::SetState,
            Command::TogglePower,
            Command::BreatheEffect,
            Command::PulseEffect,
            Command::ListScenes,
            Command::ActivateScene,
            Command::AlertFlash,
            Command::TestConnection,
            Command::HealthCheck,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::TestModule => "test-module",
            Command::ListLights => "lifx-list-lights",
            Command::SetState => "lifx-set-state",
            Command::TogglePower => "lifx-toggle-power",
            Command::BreatheEffect => "lifx-breathe-effect",
            Command::PulseEffect => "lifx-pulse-effect",
            Command::ListScenes => "lifx-list-scenes",
            Command::ActivateScene => "lifx-activate-scene",
            Command::AlertFlash => "lifx-alert-flash",
            Command::TestConnection => "lifx-test-connection",
            Command::HealthCheck => "lifx-health-check",
        }
    }

    /// Exact lookup by command name.
    pub fn from_name(s: &str) -> Option<Self> {
        Self::variants().iter().copied().find(|c| c.name() == s)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::TestModule => "Verify credentials by listing all lights",
            Command::ListLights => "List lights matching a selector",
            Command::SetState => "Set power, color, brightness or infrared",
            Command::TogglePower => "Toggle power of the selected lights",
            Command::BreatheEffect => "Run the breathe effect",
            Command::PulseEffect => "Run the pulse effect",
            Command::ListScenes => "List saved scenes",
            Command::ActivateScene => "Activate a scene by UUID",
            Command::AlertFlash => "Flash lights with severity-based color and cycles",
            Command::TestConnection => "Connection diagnostics (never fails)",
            Command::HealthCheck => "API health and rate-limit status (never fails)",
        }
    }

    /// Accepted argument names (required ones marked with `*`).
    pub fn arguments(&self) -> &'static [&'static str] {
        match self {
            Command::TestModule | Command::ListScenes => &[],
            Command::ListLights | Command::TestConnection | Command::HealthCheck => &["selector"],
            Command::SetState => &[
                "selector",
                "power",
                "color",
                "brightness",
                "duration",
                "infrared",
                "fast",
            ],
            Command::TogglePower => &["selector", "duration"],
            Command::BreatheEffect => &[
                "selector",
                "color*",
                "from_color",
                "period",
                "cycles",
                "peak",
                "persist",
                "power_on",
            ],
            Command::PulseEffect => &[
                "selector",
                "color*",
                "from_color",
                "period",
                "cycles",
                "persist",
                "power_on",
            ],
            Command::ActivateScene => &["scene_uuid*", "duration", "fast"],
            Command::AlertFlash => &[
                "selector",
                "severity",
                "color",
                "cycles",
                "period",
                "power_on",
                "persist",
            ],
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/* --------------------------------- Tests ---------------------------------- */
