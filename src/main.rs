use clap::{Parser, Subcommand};
use std::process::ExitCode;

mod cmd;
mod config;
mod lifx;
mod utils;

use cmd::entry::Artifact;
use cmd::{CatalogArgs, InvokeArgs, Output, RunArgs};
use config::Overrides;

/// LIFX Adapter - LIFX cloud API commands for security orchestration hosts
///
/// Command layout:
///   lifx-adapter run <COMMAND> [--arg KEY=VALUE ...] [--args-file PATH]
///   lifx-adapter invoke [--input PATH|-]
///   lifx-adapter commands [--filter TEXT]
///
/// Global flags / env:
///   -v / -vv        Increase verbosity (RUST_LOG overrides)
///   -q / --quiet    Errors only
///   --json          Print the host entry JSON instead of the report
///   --url           API root (or LIFX_URL; default https://api.lifx.com/v1)
///   --token         Bearer token (or LIFX_API_TOKEN)
///   --insecure      Skip TLS verification (or LIFX_INSECURE)
///   --proxy         Honor system proxy settings (or LIFX_PROXY)
///   --config PATH   JSON / YAML file with url, api_token, insecure, proxy
///
/// Exit status: 0 note, 1 error artifact (including rejected input), 2 usage error.
///
/// Examples:
///   lifx-adapter run lifx-list-lights --arg selector=group:Office
///   lifx-adapter run lifx-alert-flash --arg severity=critical --json
///   echo '{"command":"lifx-health-check"}' | lifx-adapter invoke
#[derive(Parser, Debug)]
#[command(
    name = "lifx-adapter",
    version,
    author,
    about = "LIFX Adapter - LIFX cloud API commands for security orchestration hosts",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON instead of human-readable text
    #[arg(long, global = true)]
    json: bool,

    /// LIFX API root URL
    #[arg(long, global = true, value_name = "URL")]
    url: Option<String>,

    /// LIFX personal access token
    #[arg(long, global = true, value_name = "TOKEN")]
    token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    insecure: bool,

    /// Use system / environment proxy settings
    #[arg(long, global = true)]
    proxy: bool,

    /// Configuration file (JSON or YAML)
    #[arg(long = "config", global = true, value_name = "PATH")]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one command with --arg pairs
    Run(RunArgs),

    /// Run a host invocation document
    Invoke(InvokeArgs),

    /// List supported commands
    #[command(name = "commands")]
    Catalog(CatalogArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let overrides = Overrides {
        url: cli.url,
        token: cli.token,
        insecure: cli.insecure,
        proxy: cli.proxy,
        config_path: cli.config,
    };
    let output = Output {
        json: cli.json,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Run(args) => cmd::execute_run(args, &overrides, output).map(exit_status),
        Commands::Invoke(args) => cmd::execute_invoke(args, &overrides, output).map(exit_status),
        Commands::Catalog(args) => cmd::execute_catalog(args, cli.json).map(|()| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn exit_status(artifact: Artifact) -> ExitCode {
    if artifact.is_error() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
