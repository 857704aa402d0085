use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use confer_core::{diagnose, Schema, Value};

#[derive(Parser)]
#[command(name = "confer")]
#[command(about = "Validate and scaffold environment documents against saved requirements", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a document file against a requirements file
    Validate {
        /// Document file (JSON)
        #[arg(short = 'f', long)]
        document: PathBuf,

        /// Requirements file (JSON), as printed by a host's `requirements` command
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Produce a skeleton document from a requirements file
    Template {
        /// Requirements file (JSON)
        #[arg(short, long)]
        schema: PathBuf,

        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(cli.debug) // Show target module in debug mode
        .init();

    match cli.command {
        Commands::Validate { document, schema } => handle_validate(&document, &schema),
        Commands::Template { schema, output } => handle_template(&schema, output),
    }
}

fn handle_validate(document_path: &Path, schema_path: &Path) -> Result<()> {
    let schema: Schema = read_json(schema_path)?;
    let document: Value = read_json(document_path)?;

    if schema.admits(&document) {
        println!(
            "{} satisfies requirements `{}`",
            document_path.display(),
            schema.name
        );
        return Ok(());
    }

    let findings = diagnose(&schema, &document);
    eprintln!(
        "{} rejected by requirements `{}`:",
        document_path.display(),
        schema.name
    );
    for finding in &findings {
        eprintln!("  {finding}");
    }
    anyhow::bail!("{} mismatch(es)", findings.len())
}

fn handle_template(schema_path: &Path, output: Option<PathBuf>) -> Result<()> {
    let schema: Schema = read_json(schema_path)?;
    let template = serde_json::to_string_pretty(&schema.scaffold())?;

    match output {
        Some(path) => {
            fs::write(&path, template)
                .with_context(|| format!("failed to write template to {}", path.display()))?;
            info!("template written to {}", path.display());
        }
        None => println!("{template}"),
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to decode {}", path.display()))
}
