//! Workbook I/O
//!
//! `reader` turns an `.xlsx` file into a [`RawWorkbook`]; `writer` renders an
//! [`OutputWorkbook`] with the database's presentation rules.

mod formatting;
mod reader;
mod writer;

pub use reader::read_workbook;
pub use writer::write_workbook;

use crate::ops::{Database, DropOutcome, DummyOutcome, UpdateOutcome};
use crate::schema::canonical::sheets;
use crate::table::Table;

/// Presentation applied to a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetStyle {
    /// Red header, bordered cells
    SiteList,
    /// Amber header, bordered cells
    Length,
    /// Red header, Insert Site highlight and P0 tinting
    Ring,
    /// Key/value pairs without a header row
    Summary,
    /// Pass-through sheets
    Plain,
}

/// One sheet to be written
#[derive(Debug, Clone)]
pub struct OutputSheet {
    pub name: String,
    pub table: Table,
    pub style: SheetStyle,
}

/// Sheets of an output workbook, in write order
#[derive(Debug, Clone, Default)]
pub struct OutputWorkbook {
    pub sheets: Vec<OutputSheet>,
}

impl OutputWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet; a name already present (case-insensitive) is skipped
    pub fn push(&mut self, name: impl Into<String>, table: Table, style: SheetStyle) -> bool {
        let name = name.into();
        if self.sheet(&name).is_some() {
            log::warn!("Sheet '{}' already written, pass-through copy skipped", name);
            return false;
        }
        self.sheets.push(OutputSheet { name, table, style });
        true
    }

    pub fn sheet(&self, name: &str) -> Option<&OutputSheet> {
        self.sheets.iter().find(|s| s.name.eq_ignore_ascii_case(name))
    }

    fn push_database(&mut self, db: &Database) {
        self.push(sheets::SITE_LIST, db.site_list.clone(), SheetStyle::SiteList);
        self.push(sheets::LENGTH, db.length.clone(), SheetStyle::Length);
        self.push(sheets::NEW_RING, db.rings.clone(), SheetStyle::Ring);
    }

    fn push_unused(&mut self, db: &Database) {
        for (name, table) in &db.unused {
            self.push(name.as_str(), table.clone(), SheetStyle::Plain);
        }
    }
}

/// Site List, Length, New Ring, Summary, then pass-through sheets
pub fn update_workbook(outcome: &UpdateOutcome) -> OutputWorkbook {
    let mut book = OutputWorkbook::new();
    book.push_database(&outcome.database);
    book.push(sheets::SUMMARY, outcome.summary.clone(), SheetStyle::Summary);
    book.push_unused(&outcome.database);
    book
}

/// Site List, Length, New Ring, pass-through sheets and the Drop Site record
pub fn drop_workbook(outcome: &DropOutcome) -> OutputWorkbook {
    let mut book = OutputWorkbook::new();
    book.push_database(&outcome.database);
    book.push_unused(&outcome.database);
    if !outcome.merged {
        book.push(sheets::DROP_SITE, outcome.dropped.clone(), SheetStyle::SiteList);
    }
    book
}

/// Processed rings with their Length rows and sites, the skip log, then pass-through sheets
pub fn dummy_workbook(outcome: &DummyOutcome) -> OutputWorkbook {
    let mut book = OutputWorkbook::new();
    book.push_database(&outcome.database);
    book.push(sheets::NOT_FOUND, outcome.not_found.clone(), SheetStyle::Plain);
    book.push_unused(&outcome.database);
    book
}
