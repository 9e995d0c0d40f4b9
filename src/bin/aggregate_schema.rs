//! Aggregate Schema CLI
//!
//! Loads interchange schemas, builds them and prints diagnostics, composite
//! keys, a DOT graph or the normalized document.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use aggregate_schema::config::OutputFormat;
use aggregate_schema::source::{load_from_directory, load_from_path, LoadConfig};
use aggregate_schema::{AppSchema, SchemaConfig, SchemaError, SchemaSource};

#[derive(Parser)]
#[command(name = "aggregate-schema")]
#[command(about = "Validate aggregate schemas and inspect the built graph")]
struct Cli {
    /// Configuration file layered over the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a schema and report every diagnostic
    Check {
        /// Schema file or directory of *.json files
        path: PathBuf,
    },

    /// Print the composite key of every aggregate
    Keys {
        path: PathBuf,
    },

    /// Print the aggregate graph in Graphviz DOT format
    Dot {
        path: PathBuf,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the normalized interchange document
    Export {
        path: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let config = SchemaConfig::load_from(config_path.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Check { path } => {
            let source = load(&path)?;
            match AppSchema::build(source, &config) {
                Ok(schema) => {
                    for warning in schema.warnings().iter() {
                        println!("{}", warning);
                    }
                    println!(
                        "✅ {} aggregate(s), {} root(s), {} warning(s)",
                        schema.len(),
                        schema.roots().count(),
                        schema.warnings().len()
                    );
                    if let Some(fingerprint) = schema.fingerprint() {
                        println!("   fingerprint {}", fingerprint);
                    }
                    Ok(())
                }
                Err(failure) => {
                    println!("{}", failure.diagnostics);
                    println!();
                    println!("❌ {} error(s)", failure.diagnostics.error_count());
                    std::process::exit(1);
                }
            }
        }

        Commands::Keys { path } => {
            let schema = build(&path, &config)?;
            for aggregate in schema.all_aggregates() {
                let key: Vec<_> = schema
                    .key_members(aggregate.id)
                    .map(|m| m.physical_name.as_str())
                    .collect();
                println!("{} ({}): {}", aggregate.physical_name, aggregate.kind, key.join(", "));
            }
            Ok(())
        }

        Commands::Dot { path, output } => {
            let schema = build(&path, &config)?;
            emit(&schema.to_dot(), output.as_deref())
        }

        Commands::Export { path, output } => {
            let schema = build(&path, &config)?;
            let document = schema.to_document();
            let text = match config.output.format {
                OutputFormat::Pretty => serde_json::to_string_pretty(&document)?,
                OutputFormat::Compact => serde_json::to_string(&document)?,
            };
            emit(&text, output.as_deref())
        }
    }
}

fn load(path: &Path) -> Result<SchemaSource> {
    let source = if path.is_dir() {
        load_from_directory(path, &LoadConfig::default())
    } else {
        load_from_path(path)
    };
    source.with_context(|| format!("loading {}", path.display()))
}

fn build(path: &Path, config: &SchemaConfig) -> Result<AppSchema> {
    let source = load(path)?;
    let schema = AppSchema::build(source, config).map_err(SchemaError::from)?;
    Ok(schema)
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("📄 Written to {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}
