//! Command handlers

mod drop;
mod dummy;
mod update;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use super::report::{RunReport, write_skip_log};
use super::{Cli, Commands, GlobalArgs};
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::excel::{OutputWorkbook, read_workbook, write_workbook};
use crate::ops::RawWorkbook;

/// Dispatch a parsed command line
pub fn run(cli: &Cli, config: Config) -> Result<()> {
    match &cli.command {
        Commands::Update {
            database,
            work_order,
        } => update::handle_update(&cli.global, config, database, work_order),
        Commands::Drop {
            database,
            drop_list,
        } => drop::handle_drop(&cli.global, config, database, drop_list),
        Commands::Dummy {
            database,
            ring_list,
        } => dummy::handle_dummy(&cli.global, config, database, ring_list),
    }
}

fn read_input(path: &Path, what: &str) -> Result<RawWorkbook> {
    if !path.exists() {
        anyhow::bail!("{} file does not exist: {}", what, path.display());
    }
    read_workbook(path).with_context(|| format!("Failed to read {} workbook", what.to_lowercase()))
}

/// Write the output workbook into the configured directory
fn write_output(config: &Config, file_name: String, book: &OutputWorkbook) -> Result<PathBuf> {
    let dir = &config.output.directory;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    let path = dir.join(file_name);
    write_workbook(&path, book)?;
    Ok(path)
}

fn finish<C: Serialize>(
    global: &GlobalArgs,
    command: &'static str,
    output: PathBuf,
    counts: &C,
    diagnostics: &Diagnostics,
) -> Result<()> {
    if let Some(path) = &global.skip_log {
        write_skip_log(path, diagnostics)?;
    }
    RunReport {
        command,
        output,
        counts,
        diagnostics,
    }
    .print(global.json)
}
