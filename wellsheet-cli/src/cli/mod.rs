//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::LoadConfig;
use commands::{ColumnsCommands, LoadCommands, TemplateCommands};

#[derive(Parser)]
#[command(
    name = "wellsheet",
    version,
    about = "Load well measurement workbooks into SQLite and report fact/forecast totals"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (TOML); defaults to ~/.config/wellsheet/config.toml when present
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a workbook into the database and print the totals report
    Load(LoadCommands),
    /// Print the columns derived from a workbook header
    Columns(ColumnsCommands),
    /// Write a sample workbook in the expected layout
    Template(TemplateCommands),
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = LoadConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Load(args) => commands::load::handle_load_command(args, config).await,
        Commands::Columns(args) => commands::columns::handle_columns_command(args, config),
        Commands::Template(args) => commands::template::handle_template_command(args),
    }
}
