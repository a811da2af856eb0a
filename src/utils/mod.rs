//! Logging: level derived from `-v` / `-q`, `RUST_LOG` overrides it.
//!
//! Logs go to stderr; stdout carries only the artifact (or its JSON entry).

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// `-q` wins over any `-v`.
pub fn derive_level(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(level: Level) -> String {
    format!("lifx_adapter={}", level.to_string().to_ascii_lowercase())
}

pub fn init_logging(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    // A subscriber may already be installed (tests); keep the first one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
