//! Read workbooks into raw tables

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::{NaiveDate, NaiveDateTime};

use crate::ops::RawWorkbook;
use crate::schema::sanitize::placeholder;
use crate::table::{Table, Value};

/// Read every sheet of an `.xlsx` file, first row as header
pub fn read_workbook(path: &Path) -> Result<RawWorkbook> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("Failed to open Excel file: {}", path.display()))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());
    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .with_context(|| format!("Failed to read sheet: {}", name))?;
        let table = range_to_table(&range);
        log::debug!(
            "{}: sheet '{}' with {} row(s)",
            path.display(),
            name,
            table.len()
        );
        sheets.push((name, table));
    }

    log::info!("Loaded {} sheet(s) from {}", sheets.len(), path.display());
    Ok(RawWorkbook::new(sheets))
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::default();
    };

    // empty header cells get placeholders so the sanitizer can promote a real header
    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| cell_to_value(cell).key().unwrap_or_else(|| placeholder(i)))
        .collect();
    let data = rows.map(|r| r.iter().map(cell_to_value).collect()).collect();
    Table::from_rows(columns, data)
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::Int(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(Value::DateTime)
            .unwrap_or_else(|| Value::String(dt.to_string())),
        Data::DateTime(dt) => Value::String(dt.to_string()),
        Data::DateTimeIso(s) => parse_iso(s).map(Value::DateTime).unwrap_or_else(|| Value::String(s.clone())),
        Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) => Value::Null,
    }
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
}
