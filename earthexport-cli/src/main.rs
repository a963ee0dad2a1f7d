//! earthexport CLI - Command-line interface
//!
//! Exports satellite imagery around every coordinate of a CSV file. Running
//! without a subcommand performs the export; `config` manages the
//! configuration file.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::config::ConfigCommands;
use commands::export::ExportArgs;

#[derive(Parser)]
#[command(name = "earthexport")]
#[command(version = earthexport::VERSION)]
#[command(about = "Export satellite imagery around coordinates from Google Earth Engine", long_about = None)]
struct Cli {
    /// Configuration file [default: ~/.earthexport/config.ini]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    export: ExportArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Config(command)) => commands::config::run(command, cli.config),
        None => commands::export::run(cli.export, cli.config),
    };

    if let Err(e) = result {
        e.exit();
    }
}
