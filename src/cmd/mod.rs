/*!
Command layer.

Layout:
  src/cmd/
    mod.rs          (this file)
    command.rs      (Command enum: the host's command names + help metadata)
    shared.rs       (ArgMap, boolean / severity / float normalizers, arg files)
    format.rs       (markdown reports, relative timestamps, terminal styling)
    entry.rs        (Artifact: note / error in the host entry shape)
    lights.rs       (list-lights, set-state, toggle-power)
    effects.rs      (breathe, pulse, alert-flash)
    scenes.rs       (list-scenes, activate-scene)
    diagnostics.rs  (test-module, test-connection, health-check)
    dispatch.rs     (Invocation -> handler -> exactly one Artifact)
    run.rs          (RunArgs / InvokeArgs + execute_run / execute_invoke)
    catalog.rs      (CatalogArgs + execute_catalog: the `commands` listing)

Conventions:
  - Each CLI subcommand module exposes one public `execute_*` function.
  - Argument structs derive `clap::Args` and are kept minimal.
  - Handlers are `async fn(&impl LifxApi, &ArgMap) -> anyhow::Result<Artifact>`;
    validation problems are returned as error artifacts, remote failures as Err.
*/

pub mod catalog;
pub mod command;
pub mod diagnostics;
pub mod dispatch;
pub mod effects;
pub mod entry;
pub mod format;
pub mod lights;
pub mod run;
pub mod scenes;
pub mod shared;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{CatalogArgs, execute_catalog};
pub use run::{InvokeArgs, Output, RunArgs, execute_invoke, execute_run};
