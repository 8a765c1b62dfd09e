//! Unified command-line interface for the regmill register map compiler.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "regmill", version, about = "Register map compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile specifications into HDL, C header, and HTML artifacts
    Generate {
        /// Register map specification files (.toml)
        #[arg(required = true)]
        specs: Vec<PathBuf>,
        /// Output directory
        #[arg(long, default_value = "regs_out")]
        out: PathBuf,
        /// Artifact kinds to produce (comma-separated: register-package,
        /// bus-wrapper, c-header, html-page)
        #[arg(long, value_delimiter = ',')]
        only: Option<Vec<String>>,
    },
    /// Parse and validate specifications without emitting anything
    Check {
        /// Register map specification files (.toml)
        #[arg(required = true)]
        specs: Vec<PathBuf>,
    },
    /// Print a specification's register model
    Inspect {
        /// Register map specification file (.toml)
        spec: PathBuf,
        /// Output format ("json" for the full model)
        #[arg(long)]
        export: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate { specs, out, only } => {
            commands::generate::run(&specs, &out, only.as_deref())
        }
        Commands::Check { specs } => commands::check::run(&specs),
        Commands::Inspect { spec, export } => commands::inspect::run(&spec, export.as_deref()),
    }
}
