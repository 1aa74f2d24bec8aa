//! `ringdb update`

use std::path::Path;

use anyhow::{Context, Result};

use super::{finish, read_input, write_output};
use crate::cli::GlobalArgs;
use crate::config::Config;
use crate::excel::update_workbook;
use crate::naming::{next_version, update_file_name};
use crate::ops::{load_work_order, reconcile_and_load, splice_update};

pub fn handle_update(
    global: &GlobalArgs,
    config: Config,
    database: &Path,
    work_order: &Path,
) -> Result<()> {
    let ctx = global.run_context(config).with_version(next_version(database));

    let db = reconcile_and_load(read_input(database, "Database")?, &ctx.config)
        .with_context(|| format!("Failed to load database: {}", database.display()))?;
    let order = load_work_order(read_input(work_order, "Work order")?, &ctx.config)
        .with_context(|| format!("Failed to load work order: {}", work_order.display()))?;

    let outcome = splice_update(db, &order, &ctx).context("Database update aborted")?;

    let output = ctx.config.output.clone();
    let file_name = update_file_name(ctx.today, &output.date_format, &output.label, &ctx.version);
    let path = write_output(&ctx.config, file_name, &update_workbook(&outcome))?;

    finish(global, "update", path, &outcome.counts, &outcome.diagnostics)
}
