//! Run report printed after a command

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Everything a command reports once its workbook is written
#[derive(Debug, Serialize)]
pub struct RunReport<'a, C: Serialize> {
    pub command: &'static str,
    pub output: PathBuf,
    pub counts: &'a C,
    pub diagnostics: &'a Diagnostics,
}

impl<C: Serialize> RunReport<'_, C> {
    /// Print as JSON or as a colored summary
    pub fn print(&self, json: bool) -> Result<()> {
        if json {
            let text = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
            println!("{}", text);
            return Ok(());
        }

        println!(
            "{} {} -> {}",
            "✓".bright_green().bold(),
            self.command.bold(),
            self.output.display().to_string().cyan()
        );
        let counts = serde_json::to_value(self.counts).context("Failed to serialize counts")?;
        if let Some(map) = counts.as_object() {
            for (key, value) in map {
                println!("  {:<20} {}", key.replace('_', " "), value.to_string().bold());
            }
        }

        let skips = self.diagnostics.skips().count();
        let defaults = self.diagnostics.count(DiagnosticKind::MissingAttribute);
        if skips == 0 && defaults == 0 {
            println!("  {}", "no skips".green());
            return Ok(());
        }
        if skips > 0 {
            println!("  {} {}", skips.to_string().yellow().bold(), "skipped".yellow());
            for entry in self.diagnostics.skips() {
                println!(
                    "    {} ring={} site={} {}",
                    format!("[{}]", entry.kind).yellow(),
                    entry.ring_id.as_deref().unwrap_or("-"),
                    entry.site_id.as_deref().unwrap_or("-"),
                    entry.reason.dimmed()
                );
            }
        }
        if defaults > 0 {
            println!("  {} attribute(s) defaulted", defaults.to_string().yellow());
        }
        Ok(())
    }
}

/// Write the skip log as CSV
pub fn write_skip_log(path: &Path, diagnostics: &Diagnostics) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create skip log: {}", path.display()))?;
    diagnostics.write_csv(file)?;
    log::info!("Skip log written to {}", path.display());
    Ok(())
}
