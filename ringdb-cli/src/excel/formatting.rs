//! Cell formats of the database sheets

use std::ops::Range;

use rust_xlsxwriter::{Color, Format, FormatBorder};

use crate::schema::canonical::{ring, tags};
use crate::table::{Table, Value};

use super::SheetStyle;

const RED: Color = Color::RGB(0xFF0000);
const AMBER: Color = Color::RGB(0xFFC000);
const YELLOW: Color = Color::RGB(0xFFFF00);
const LIGHT_BLUE: Color = Color::RGB(0xADD8E6);

/// Thousands separators, up to 8 decimals
const DECIMAL_FORMAT: &str = "#,##0.########";
const WHOLE_FORMAT: &str = "#,##0";

/// Priority value marking a top-priority endpoint
const P0: &str = "P0";

/// Background of a data cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    None,
    /// "Insert Site" cells
    Highlight,
    /// P0 endpoint block
    Tint,
}

pub fn header_format(style: SheetStyle) -> Format {
    let base = Format::new().set_bold().set_border(FormatBorder::Thin);
    match style {
        SheetStyle::SiteList | SheetStyle::Ring => base
            .set_background_color(RED)
            .set_font_color(Color::White),
        SheetStyle::Length => base.set_background_color(AMBER).set_font_color(Color::Black),
        SheetStyle::Summary | SheetStyle::Plain => base,
    }
}

pub fn cell_format(fill: Fill, value: &Value) -> Format {
    let mut format = Format::new().set_border(FormatBorder::Thin);
    if let Value::Float(f) = value {
        format = format.set_num_format(if f.fract() == 0.0 { WHOLE_FORMAT } else { DECIMAL_FORMAT });
    }
    match fill {
        Fill::None => format,
        Fill::Highlight => format.set_background_color(YELLOW),
        Fill::Tint => format.set_background_color(LIGHT_BLUE),
    }
}

/// Origin and destination column blocks tinted for P0 endpoints.
///
/// The origin block runs from Origin Site ID up to the column before the one
/// preceding Destination; the destination block from Destination through
/// Priority_2.
pub fn endpoint_blocks(columns: &[String]) -> Option<(Range<usize>, Range<usize>)> {
    let at = |name: &str| columns.iter().position(|c| c == name);
    let origin = at(ring::ORIGIN)?;
    let destination = at(ring::DESTINATION)?;
    let priority_2 = at(ring::PRIORITY_2)?;
    let origin_end = destination.saturating_sub(1).max(origin);
    Some((origin..origin_end, destination..priority_2 + 1))
}

/// Per-sheet fill rules, resolved once per sheet
#[derive(Debug, Clone)]
pub struct FillRules {
    style: SheetStyle,
    blocks: Option<(Range<usize>, Range<usize>)>,
}

impl FillRules {
    pub fn new(table: &Table, style: SheetStyle) -> Self {
        let blocks = match style {
            SheetStyle::Ring => endpoint_blocks(table.columns()),
            _ => None,
        };
        Self { style, blocks }
    }

    pub fn fill(&self, table: &Table, row: usize, col: usize, value: &Value) -> Fill {
        if self.style != SheetStyle::Ring {
            return Fill::None;
        }
        if let Some((origin, destination)) = &self.blocks {
            let p0 = |column: &str| table.cell(row, column).key().as_deref() == Some(P0);
            if (origin.contains(&col) && p0(ring::PRIORITY_1))
                || (destination.contains(&col) && p0(ring::PRIORITY_2))
            {
                return Fill::Tint;
            }
        }
        if value.has_tag(tags::INSERT_SITE) {
            Fill::Highlight
        } else {
            Fill::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<String> {
        [
            "Ring ID",
            "Origin Site ID",
            "Origin_Name",
            "Long_1",
            "Link Name",
            "Destination",
            "Destination_Name",
            "Priority_1",
            "Priority_2",
            "Vendor",
        ]
        .map(String::from)
        .to_vec()
    }

    #[test]
    fn test_endpoint_blocks() {
        assert_eq!(endpoint_blocks(&columns()), Some((1..4, 5..9)));
        assert_eq!(endpoint_blocks(&["Site ID".to_string()]), None);
    }

    #[test]
    fn test_fill_rules() {
        let table = Table::from_rows(
            columns(),
            vec![
                vec![
                    "R1".into(),
                    "A".into(),
                    Value::Null,
                    Value::Null,
                    Value::Null,
                    "B".into(),
                    "Insert Site".into(),
                    "P0".into(),
                    "Access".into(),
                ],
                vec!["R1".into(), "B".into()],
            ],
        );
        let rules = FillRules::new(&table, SheetStyle::Ring);
        let fill = |r: usize, c: usize| rules.fill(&table, r, c, &table.rows()[r][c]);
        assert_eq!(fill(0, 1), Fill::Tint);
        assert_eq!(fill(0, 4), Fill::None);
        assert_eq!(fill(0, 6), Fill::Highlight);
        assert_eq!(fill(1, 1), Fill::None);

        let plain = FillRules::new(&table, SheetStyle::Plain);
        assert_eq!(plain.fill(&table, 0, 6, &table.rows()[0][6]), Fill::None);
    }
}
