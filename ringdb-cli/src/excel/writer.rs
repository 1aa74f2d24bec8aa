//! Write output workbooks

use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::table::Value;

use super::formatting::{FillRules, cell_format, header_format};
use super::{OutputSheet, OutputWorkbook, SheetStyle};

/// Write every sheet in full, replacing any existing file
pub fn write_workbook(path: &Path, book: &OutputWorkbook) -> Result<()> {
    let mut workbook = Workbook::new();
    for sheet in &book.sheets {
        write_sheet(&mut workbook, sheet)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to save Excel file: {}", path.display()))?;

    log::info!(
        "Wrote {} sheet(s) to {}",
        book.sheets.len(),
        path.display()
    );
    Ok(())
}

fn write_sheet(workbook: &mut Workbook, sheet: &OutputSheet) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(&sheet.name)
        .with_context(|| format!("Invalid sheet name: {}", sheet.name))?;

    let table = &sheet.table;
    let offset = match sheet.style {
        SheetStyle::Summary => 0,
        style => {
            let format = header_format(style);
            for (col, name) in table.columns().iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, name, &format)?;
            }
            1
        }
    };

    let rules = FillRules::new(table, sheet.style);
    for (r, cells) in table.rows().iter().enumerate() {
        let row = (r + offset) as u32;
        for (col, value) in cells.iter().enumerate() {
            let format = cell_format(rules.fill(table, r, col, value), value);
            write_value(worksheet, row, col as u16, value, &format)?;
        }
    }

    worksheet.autofit();
    log::debug!("Sheet '{}': {} row(s)", sheet.name, table.len());
    Ok(())
}

fn write_value(ws: &mut Worksheet, row: u32, col: u16, value: &Value, format: &Format) -> Result<()> {
    match value {
        Value::Null => { ws.write_blank(row, col, format)?; }
        Value::String(s) => { ws.write_string_with_format(row, col, s, format)?; }
        Value::Int(i) => { ws.write_number_with_format(row, col, *i as f64, format)?; }
        Value::Float(f) if f.is_finite() => { ws.write_number_with_format(row, col, *f, format)?; }
        Value::Float(_) => { ws.write_blank(row, col, format)?; }
        Value::Bool(b) => { ws.write_boolean_with_format(row, col, *b, format)?; }
        Value::DateTime(dt) => { ws.write_string_with_format(row, col, dt.to_string(), format)?; }
    }
    Ok(())
}
