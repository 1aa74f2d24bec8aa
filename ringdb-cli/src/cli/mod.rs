//! Command-line interface

pub mod commands;
mod report;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Config;
use crate::ops::RunContext;

#[derive(Parser)]
#[command(name = "ringdb")]
#[command(about = "Maintain fiber-ring topology databases stored as Excel workbooks")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (defaults to <config dir>/ringdb/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the output workbook
    #[arg(long, short = 'o', global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Abort on duplicate Length rows instead of skipping the ring
    #[arg(long, global = true)]
    pub strict: bool,

    /// Write the skip log as CSV
    #[arg(long, global = true, value_name = "FILE")]
    pub skip_log: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Run date used for stamps and file names (defaults to today)
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a weekly work order to the database
    Update {
        /// Current database workbook
        database: PathBuf,
        /// Work order workbook (Site List, New Ring, Insert Ring, Del Segment)
        work_order: PathBuf,
    },
    /// Remove sites and reconnect their rings
    Drop {
        /// Current database workbook
        database: PathBuf,
        /// Drop request workbook (Site ID, Ring ID)
        drop_list: PathBuf,
    },
    /// Build an insertion-test database from a ring list
    Dummy {
        /// Current database workbook
        database: PathBuf,
        /// Ring list workbook (Site List, Insert Ring)
        ring_list: PathBuf,
    },
}

impl GlobalArgs {
    /// Config file with command-line overrides applied
    pub fn load_config(&self) -> Result<Config> {
        Ok(self.apply_overrides(Config::load(self.config.as_deref())?))
    }

    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir.clone());
        }
        if self.strict {
            config = config.with_strict_ambiguity(true);
        }
        config
    }

    /// Logger filter: `-v` flags win over the configured level
    pub fn log_filter(&self, config: &Config) -> String {
        match self.verbose {
            0 => config.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    pub fn run_context(&self, config: Config) -> RunContext {
        let today = self.date.unwrap_or_else(|| Local::now().date_naive());
        RunContext::new(today, config)
    }
}
