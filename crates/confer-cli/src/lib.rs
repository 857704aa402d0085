//! Embeddable command surface for confer environments.
//!
//! Hosting applications mount [`EnvCommand`] under their own clap tree and
//! hand it to [`run`] together with their registry and store. [`boot`] is
//! the startup hook: given `--env-file`, it resolves the document before the
//! application begins serving, so a bad document stops the process at boot
//! rather than at first use.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::info;

use confer_core::{diagnose, Value};
use confer_runtime::{EnvError, Environment, RecordStore, Registry};

/// Environment subcommands a hosting application can mount.
#[derive(Debug, Subcommand)]
pub enum EnvCommand {
    /// Print the composite requirements as JSON
    Requirements {
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Check a document file against the composite requirements
    Validate {
        /// Document file (JSON)
        file: PathBuf,
    },
    /// Print a skeleton document derived from the requirements
    Template {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run one environment subcommand against a registry and its store.
pub async fn run(
    command: EnvCommand,
    registry: &Registry,
    store: &dyn RecordStore,
) -> Result<()> {
    match command {
        EnvCommand::Requirements { compact } => {
            let requirements = registry.requirements(store).await?;
            let json = if compact {
                serde_json::to_string(&requirements)?
            } else {
                serde_json::to_string_pretty(&requirements)?
            };
            println!("{json}");
            Ok(())
        }
        EnvCommand::Validate { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read document file {}", file.display()))?;
            let document: Value = serde_json::from_str(&raw)
                .with_context(|| format!("failed to decode document file {}", file.display()))?;
            let requirements = registry.requirements(store).await?;
            if requirements.admits(&document) {
                println!(
                    "document {} satisfies the current requirements",
                    file.display()
                );
                Ok(())
            } else {
                for finding in diagnose(&requirements, &document) {
                    eprintln!("  {finding}");
                }
                anyhow::bail!("document {} rejected", file.display())
            }
        }
        EnvCommand::Template { output } => {
            let requirements = registry.requirements(store).await?;
            let template = serde_json::to_string_pretty(&requirements.scaffold())?;
            match output {
                Some(path) => {
                    std::fs::write(&path, template).with_context(|| {
                        format!("failed to write template to {}", path.display())
                    })?;
                    info!("template written to {}", path.display());
                }
                None => println!("{template}"),
            }
            Ok(())
        }
    }
}

/// Startup arguments for the boot hook, flattened into the host's CLI.
#[derive(Debug, Default, Args)]
pub struct BootArgs {
    /// Environment document resolved before the application starts
    #[arg(long = "env-file", value_name = "PATH")]
    pub env_file: Option<PathBuf>,
}

/// Resolve the startup document, if one was given.
///
/// Returns `Ok(None)` when no `--env-file` was passed: hosts treat the
/// environment as absent until deployment wires one in. Errors keep the
/// typed [`EnvError`] so hosts can distinguish a rejected document from a
/// wiring bug.
pub async fn boot(
    args: &BootArgs,
    registry: &Registry,
    store: &dyn RecordStore,
) -> Result<Option<Environment>, EnvError> {
    let Some(path) = args.env_file.as_deref() else {
        return Ok(None);
    };
    info!("booting environment from {}", path.display());
    let env = registry.resolve_file(path, store).await?;
    Ok(Some(env))
}
