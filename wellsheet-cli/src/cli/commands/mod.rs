pub mod columns;
pub mod load;
pub mod template;

use std::path::PathBuf;

use clap::Args;

use crate::config::LoadConfig;
use crate::storage::FailurePolicy;

/// Source selection shared by commands that read a workbook
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Workbook to read
    #[arg(short, long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Worksheet name (first sheet by default)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Category kept out of crossed columns; repeat to list several (replaces the configured list)
    #[arg(short, long, value_name = "NAME")]
    pub exclude: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LoadCommands {
    #[command(flatten)]
    pub source: SourceArgs,

    /// SQLite database path
    #[arg(short, long, value_name = "PATH")]
    pub database: Option<String>,

    /// Table to (re)create
    #[arg(short, long)]
    pub table: Option<String>,

    /// Abort on the first failing statement instead of rolling back and continuing
    #[arg(long)]
    pub strict: bool,

    /// Seed for the generated dates
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write the report to a CSV file
    #[arg(long, value_name = "FILE")]
    pub export_csv: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ColumnsCommands {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print the schema as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct TemplateCommands {
    /// Where to write the workbook
    #[arg(value_name = "FILE")]
    pub path: PathBuf,
}

impl SourceArgs {
    fn apply(&self, config: &mut LoadConfig) {
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(sheet) = &self.sheet {
            config.sheet = Some(sheet.clone());
        }
        if !self.exclude.is_empty() {
            config.exclude = self.exclude.clone();
        }
    }
}

impl LoadCommands {
    /// Layer command-line overrides on top of the loaded config
    pub fn apply(&self, config: &mut LoadConfig) {
        self.source.apply(config);
        if let Some(database) = &self.database {
            config.database = database.clone();
        }
        if let Some(table) = &self.table {
            config.table = table.clone();
        }
        if self.strict {
            config.failure_policy = FailurePolicy::Strict;
        }
        if self.seed.is_some() {
            config.dates.seed = self.seed;
        }
    }
}

impl ColumnsCommands {
    pub fn apply(&self, config: &mut LoadConfig) {
        self.source.apply(config);
    }
}
