//! Autrace CLI
//!
//! Command-line interface for transaction analysis

use std::path::PathBuf;

use autrace_core::logging_facility::{init, Profile};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "autrace")]
#[command(about = "Autrace - Transaction evolution and relationship analysis", long_about = None)]
struct Cli {
    /// Analysis configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    /// Write output here instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one transaction (summary, hierarchy, flow)
    Analyze(commands::analyze::AnalyzeArgs),
    /// Diff two versions of a transaction
    Diff(commands::diff::DiffArgs),
    /// Build the flow graph of one transaction
    Flow(commands::flow::FlowArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = commands::Context::load(cli.config.as_deref(), cli.output).and_then(|ctx| {
        match cli.command {
            Commands::Analyze(args) => commands::analyze::execute(args, &ctx),
            Commands::Diff(args) => commands::diff::execute(args, &ctx),
            Commands::Flow(args) => commands::flow::execute(args, &ctx),
        }
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
