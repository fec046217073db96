//! Load command handler

use std::io;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use colored::*;

use super::LoadCommands;
use crate::config::LoadConfig;
use crate::pipeline::run_load;
use crate::report::{export_report_csv, pretty_print};

/// Load the workbook, print the totals report and optionally export it
pub async fn handle_load_command(args: LoadCommands, mut config: LoadConfig) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }

    args.apply(&mut config);

    if !config.source.exists() {
        bail!("Source workbook does not exist: {}", config.source.display());
    }

    let start = Instant::now();
    let rows = run_load(&config).await?;

    {
        let mut stdout = io::stdout().lock();
        pretty_print(&mut stdout, &rows).context("Failed to print report")?;
    }

    if let Some(path) = &args.export_csv {
        export_report_csv(&rows, path)?;
        println!("Report exported to {}", path.display().to_string().cyan());
    }

    log::info!(
        "Loaded {} into '{}' in {:.2}ms",
        config.source.display(),
        config.table,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(())
}
