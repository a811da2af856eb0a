/*!
`run.rs`

Implements the `run` and `invoke` subcommands: build one `Invocation`, hand it
to the dispatcher, print the single artifact it returns.

Argument sources:
  run     COMMAND --arg KEY=VALUE ... [--args-file PATH]
            (file entries are merged under --arg pairs; --arg wins)
  invoke  --input PATH | -   (host document: {"command", "args", "params"})
            (params feed configuration below CLI flags and environment)

Output:
  --json  the host entry, pretty printed
  human   the markdown report; error artifacts inside a red box

Anything that prevents building the invocation (bad --arg, unreadable file,
malformed document, unreadable --config) still yields exactly one artifact:
an error "Invalid invocation. Error: <reason>".
*/

use anyhow::{Context, Result};
use clap::Args;
use std::io::Read;

use crate::cmd::dispatch::{HostInvocation, Invocation, dispatch};
use crate::cmd::entry::Artifact;
use crate::cmd::format::{Role, StyleOptions, box_header, color, emoji};
use crate::cmd::shared::{ArgMap, parse_document};
use crate::config::{self, Overrides};

/* -------------------------------------------------------------------------- */
/* Argument Structs                                                           */
/* -------------------------------------------------------------------------- */

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Command name (see `lifx-adapter commands`)
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Command argument (KEY=VALUE), repeatable
    #[arg(long = "arg", value_name = "KEY=VALUE")]
    pub args: Vec<String>,

    /// Load arguments from file (JSON or YAML). --arg overrides file entries
    #[arg(long = "args-file", value_name = "PATH")]
    pub args_file: Option<String>,
}

#[derive(Args, Debug)]
pub struct InvokeArgs {
    /// Invocation document (JSON, or YAML by extension); `-` reads stdin
    #[arg(long, value_name = "PATH", default_value = "-")]
    pub input: String,
}

/// How the artifact is printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

/* -------------------------------------------------------------------------- */
/* Public Entry Points                                                        */
/* -------------------------------------------------------------------------- */

pub fn execute_run(args: RunArgs, overrides: &Overrides, output: Output) -> Result<Artifact> {
    let label = args.command.clone();
    match build_run(args, overrides) {
        Ok(invocation) => finish(&invocation, output),
        Err(e) => rejected(&label, e, output),
    }
}

pub fn execute_invoke(args: InvokeArgs, overrides: &Overrides, output: Output) -> Result<Artifact> {
    let built = read_input(&args.input).and_then(|raw| build_invoke(&args.input, &raw, overrides));
    match built {
        Ok(invocation) => finish(&invocation, output),
        Err(e) => rejected("invoke", e, output),
    }
}

/* -------------------------------------------------------------------------- */
/* Invocation Building                                                        */
/* -------------------------------------------------------------------------- */

fn build_run(args: RunArgs, overrides: &Overrides) -> Result<Invocation> {
    let mut command_args = ArgMap::from_pairs(&args.args)?;
    if let Some(path) = &args.args_file {
        command_args.merge_missing(ArgMap::load_file(path)?);
    }
    let config = config::resolve(overrides, &ArgMap::new())?;
    Ok(Invocation {
        command: args.command,
        args: command_args,
        config,
    })
}

fn build_invoke(path: &str, raw: &str, overrides: &Overrides) -> Result<Invocation> {
    let document = parse_document(path, raw)?;
    let host: HostInvocation =
        serde_json::from_value(document).context("invalid invocation document")?;
    let config = config::resolve(overrides, &host.params)?;
    Ok(Invocation {
        command: host.command,
        args: host.args,
        config,
    })
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read invocation from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read invocation file: {path}"))
}

/* -------------------------------------------------------------------------- */
/* Output                                                                     */
/* -------------------------------------------------------------------------- */

fn finish(invocation: &Invocation, output: Output) -> Result<Artifact> {
    let artifact = dispatch(invocation);
    emit(&invocation.command, &artifact, output)?;
    Ok(artifact)
}

/// Error artifact for an invocation that could not be built.
fn rejected(label: &str, e: anyhow::Error, output: Output) -> Result<Artifact> {
    let reason = format!("{e:#}");
    tracing::error!(error = %reason, "invocation rejected");
    let artifact = Artifact::error(format!("Invalid invocation. Error: {reason}"));
    emit(label, &artifact, output)?;
    Ok(artifact)
}

fn emit(label: &str, artifact: &Artifact, output: Output) -> Result<()> {
    if output.json {
        let entry = serde_json::to_string_pretty(&artifact.to_entry())
            .context("failed to serialize entry")?;
        println!("{entry}");
        return Ok(());
    }

    let style = StyleOptions::detect();
    if artifact.is_error() {
        println!(
            "{}",
            render_error(label, artifact.human_readable(), &style)
        );
    } else {
        println!("{}", artifact.human_readable());
        if !output.quiet {
            eprintln!("{}", render_done(label, &style));
        }
    }
    Ok(())
}

fn render_done(command: &str, style: &StyleOptions) -> String {
    format!(
        "{} {}",
        emoji("success", style),
        color(Role::Success, format!("{} completed", command.trim()), style)
    )
    .trim_start()
    .to_string()
}

fn render_error(command: &str, message: &str, style: &StyleOptions) -> String {
    let title = format!("{} {} failed", emoji("error", style), command.trim());
    let boxed = box_header(
        title.trim_start(),
        Some(color(Role::Error, message, style)),
        style,
    );
    let hint = format!(
        "{} {}",
        emoji("info", style),
        color(
            Role::Dim,
            "Re-run with --json for the host entry, or -v for request logs.",
            style
        )
    );
    format!("{boxed}\n{}", hint.trim_start())
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
