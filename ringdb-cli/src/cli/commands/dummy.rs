//! `ringdb dummy`

use std::path::Path;

use anyhow::{Context, Result};

use super::{finish, read_input, write_output};
use crate::cli::GlobalArgs;
use crate::config::Config;
use crate::excel::dummy_workbook;
use crate::naming::dummy_file_name;
use crate::ops::{generate_insertion_test, load_ring_list, reconcile_and_load};

pub fn handle_dummy(
    global: &GlobalArgs,
    config: Config,
    database: &Path,
    ring_list: &Path,
) -> Result<()> {
    let ctx = global.run_context(config);

    let db = reconcile_and_load(read_input(database, "Database")?, &ctx.config)
        .with_context(|| format!("Failed to load database: {}", database.display()))?;
    let list = load_ring_list(read_input(ring_list, "Ring list")?, &ctx.config)
        .with_context(|| format!("Failed to load ring list: {}", ring_list.display()))?;

    let outcome = generate_insertion_test(&db, &list, &ctx).context("Insertion test aborted")?;

    let file_name = dummy_file_name(ctx.today, &ctx.config.output.date_format);
    let path = write_output(&ctx.config, file_name, &dummy_workbook(&outcome))?;

    finish(global, "dummy", path, &outcome.counts, &outcome.diagnostics)
}
