mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::structures::{CreateStructureArgs, DeleteStructureArgs, ListStructuresArgs};
use commands::waterfall::CalculateArgs;

/// Promote-structure management and waterfall distribution calculations
#[derive(Parser)]
#[command(
    name = "promote",
    version,
    about = "Promote-structure management and waterfall distribution calculations",
    long_about = "A CLI for managing named promote structures per deal and running \
                  multi-tier waterfall distribution calculations with decimal \
                  precision. Structures persist to a JSON store file; calculations \
                  accept a stored structure id or a fully inline tier list."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to the JSON structure store
    #[arg(long, default_value = "promote-structures.json", global = true)]
    store: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a named promote structure for a deal
    CreateStructure(CreateStructureArgs),
    /// List promote structures for a deal
    ListStructures(ListStructuresArgs),
    /// Delete a promote structure by id
    DeleteStructure(DeleteStructureArgs),
    /// Run a waterfall distribution calculation
    Calculate(CalculateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::CreateStructure(args) => commands::structures::run_create(args, &cli.store),
        Commands::ListStructures(args) => commands::structures::run_list(args, &cli.store),
        Commands::DeleteStructure(args) => commands::structures::run_delete(args, &cli.store),
        Commands::Calculate(args) => commands::waterfall::run_calculate(args, &cli.store),
        Commands::Version => {
            println!("promote {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
