//! Header sanitizing for sheets exported from formatted spreadsheets
//!
//! Formatted workbooks often carry a title block above the real header, so
//! the reader sees placeholder column names (`Unnamed: 0`, ...). The
//! sanitizer promotes the first real header row, removes empty rows and
//! columns, and makes column names unique.

use std::collections::HashSet;

use crate::table::Table;

/// Leading rows scanned for a real header
pub const DEFAULT_PREVIEW_ROWS: usize = 5;

/// Prefix the reader gives to header cells that were empty
pub const PLACEHOLDER_PREFIX: &str = "Unnamed";

/// Header text standing for an empty cell
const EMPTY_TOKEN: &str = "nan";

/// Placeholder header used for an empty header cell at `index`
pub fn placeholder(index: usize) -> String {
    format!("{}: {}", PLACEHOLDER_PREFIX, index)
}

/// Normalise a raw table into a canonical dataset
pub fn sanitize(mut table: Table, preview_rows: usize) -> Table {
    promote_header(&mut table, preview_rows);

    let cleaned: Vec<String> = table.columns().iter().map(|c| clean_header(c)).collect();
    table.set_columns(cleaned);

    table.retain_rows(|r| !r.iter().all(|v| v.is_empty()));
    if !table.is_empty() {
        let empty_cols: HashSet<usize> = (0..table.columns().len())
            .filter(|&c| table.rows().iter().all(|r| r[c].is_empty()))
            .collect();
        table.retain_columns(|i, _| !empty_cols.contains(&i));
    }
    table.retain_columns(|_, name| !name.is_empty() && !name.eq_ignore_ascii_case(EMPTY_TOKEN));

    let unique = dedupe_columns(table.columns());
    table.set_columns(unique);
    table
}

/// Replace a placeholder header with the first row whose first cell is filled
fn promote_header(table: &mut Table, preview_rows: usize) {
    let looks_synthetic = table
        .columns()
        .first()
        .is_some_and(|c| c.trim().is_empty() || c.starts_with(PLACEHOLDER_PREFIX));
    if !looks_synthetic {
        return;
    }

    let limit = preview_rows.min(table.len());
    let found = (0..limit).find(|&i| {
        table
            .row(i)
            .and_then(|r| r.first())
            .is_some_and(|v| !v.is_empty())
    });

    let Some(idx) = found else {
        log::debug!("No header row within the first {} rows", limit);
        return;
    };

    let header: Vec<String> = table
        .row(idx)
        .map(|r| {
            r.iter()
                .map(|v| match v.key() {
                    Some(k) => k,
                    None => EMPTY_TOKEN.to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    table.set_columns(header);
    table.drop_leading_rows(idx + 1);
    log::info!(
        "Header sanitized | Start from row {} | Columns: {:?} ...",
        idx + 1,
        table.columns().iter().take(3).collect::<Vec<_>>()
    );
}

/// Trim, drop line breaks and strip appended `.N` suffixes
fn clean_header(raw: &str) -> String {
    let flat: String = raw.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let flat = flat.trim();
    match flat.rsplit_once('.') {
        Some((base, digits))
            if !base.trim().is_empty()
                && !digits.is_empty()
                && digits.chars().all(|c| c.is_ascii_digit()) =>
        {
            base.trim().to_string()
        }
        _ => flat.to_string(),
    }
}

/// Suffix repeated names: the first keeps its name, later ones get `_1`, `_2`, ...
pub fn dedupe_columns(columns: &[String]) -> Vec<String> {
    let mut taken: HashSet<String> = columns.iter().cloned().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut renamed = Vec::with_capacity(columns.len());

    for col in columns {
        if seen.insert(col.as_str()) {
            renamed.push(col.clone());
            continue;
        }
        let mut n = 1;
        let mut candidate = format!("{}_{}", col, n);
        while taken.contains(&candidate) {
            n += 1;
            candidate = format!("{}_{}", col, n);
        }
        log::info!("Duplicate column '{}' renamed to '{}'", col, candidate);
        taken.insert(candidate.clone());
        renamed.push(candidate);
    }

    renamed
}
