//! `ringdb drop`

use std::path::Path;

use anyhow::{Context, Result};

use super::{finish, read_input, write_output};
use crate::cli::GlobalArgs;
use crate::config::Config;
use crate::excel::drop_workbook;
use crate::naming::drop_file_name;
use crate::ops::{load_drop_list, reconcile_and_load, splice_drop};

pub fn handle_drop(
    global: &GlobalArgs,
    config: Config,
    database: &Path,
    drop_list: &Path,
) -> Result<()> {
    let ctx = global.run_context(config);

    let db = reconcile_and_load(read_input(database, "Database")?, &ctx.config)
        .with_context(|| format!("Failed to load database: {}", database.display()))?;
    let list = load_drop_list(read_input(drop_list, "Drop list")?, &ctx.config)
        .with_context(|| format!("Failed to load drop list: {}", drop_list.display()))?;

    let outcome = splice_drop(db, &list, &ctx).context("Site drop aborted")?;

    let file_name = drop_file_name(ctx.today, &ctx.config.output.date_format);
    let path = write_output(&ctx.config, file_name, &drop_workbook(&outcome))?;

    finish(global, "drop", path, &outcome.counts, &outcome.diagnostics)
}
