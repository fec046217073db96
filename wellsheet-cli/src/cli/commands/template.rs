//! Template command handler

use anyhow::{Result, bail};
use colored::*;

use super::TemplateCommands;
use crate::sheet::write_template;

pub fn handle_template_command(args: TemplateCommands) -> Result<()> {
    if args.path.exists() {
        bail!("Refusing to overwrite existing file: {}", args.path.display());
    }

    write_template(&args.path)?;
    println!(
        "Template written to {}",
        args.path.display().to_string().cyan()
    );
    Ok(())
}
