//! Loading raw workbooks into canonical datasets
//!
//! Sheets are found by fuzzy name, sanitized, and bound to their canonical
//! schema once. Sheets of the database that are not used by a run are kept
//! as-is so they can be written back unchanged.

use crate::config::Config;
use crate::error::EngineError;
use crate::schema::canonical::{sheets, site};
use crate::schema::{self, SchemaSpec, resolve};
use crate::table::Table;

/// Sheets of a workbook in file order, as read from disk
#[derive(Debug, Clone, Default)]
pub struct RawWorkbook {
    pub sheets: Vec<(String, Table)>,
}

impl RawWorkbook {
    pub fn new(sheets: Vec<(String, Table)>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Remove and return the sheet whose name best matches `wanted`
    fn take(&mut self, wanted: &str, threshold: f64) -> Option<(String, Table)> {
        let names: Vec<String> = self.sheets.iter().map(|(n, _)| n.clone()).collect();
        let hit = resolve(wanted, &names, threshold)?;
        log::info!(
            "Sheet '{}' matched to '{}' (score {:.2})",
            wanted,
            hit.name,
            hit.score
        );
        let idx = self.sheets.iter().position(|(n, _)| n == hit.name)?;
        Some(self.sheets.remove(idx))
    }

    /// Remove and return the first sheet
    fn take_first(&mut self) -> Option<(String, Table)> {
        if self.sheets.is_empty() {
            None
        } else {
            Some(self.sheets.remove(0))
        }
    }
}

/// Current state of the ring database
#[derive(Debug, Clone, Default)]
pub struct Database {
    pub site_list: Table,
    pub length: Table,
    pub rings: Table,
    /// Sheets carried through untouched, in file order
    pub unused: Vec<(String, Table)>,
}

/// A weekly work order
#[derive(Debug, Clone, Default)]
pub struct WorkOrder {
    pub site_list: Table,
    pub new_ring: Table,
    pub insert_ring: Table,
    pub del_segment: Table,
}

/// Insertion-test request: one row per inserted site
#[derive(Debug, Clone, Default)]
pub struct RingList {
    pub site_list: Table,
    pub insert_ring: Table,
}

/// Sites to decommission, with the ring each belongs to
#[derive(Debug, Clone, Default)]
pub struct DropList {
    pub requests: Table,
}

fn bind(
    raw: Table,
    spec: &SchemaSpec,
    dataset: &str,
    config: &Config,
    threshold: f64,
) -> Result<Table, EngineError> {
    let sanitized = schema::sanitize(raw, config.sanitize.preview_rows);
    let table = schema::normalize_schema(sanitized, spec, dataset, threshold)?;
    if spec.fields.iter().any(|f| f.name == site::SITE_ID_IOH) {
        schema::require_any(&table, dataset, &[site::SITE_ID, site::SITE_ID_IOH])?;
    }
    log::debug!(
        "{}: {} row(s), {} column(s)",
        dataset,
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Find, sanitize and bind one sheet
fn load_sheet(
    raw: &mut RawWorkbook,
    wanted: &str,
    spec: &SchemaSpec,
    config: &Config,
) -> Result<Table, EngineError> {
    let (_, table) = raw
        .take(wanted, config.thresholds.sheet)
        .ok_or_else(|| EngineError::schema("workbook", wanted))?;
    bind(table, spec, wanted, config, config.thresholds.column)
}

fn non_empty(table: Table, dataset: &str) -> Result<Table, EngineError> {
    if table.is_empty() {
        return Err(EngineError::missing_dataset(dataset));
    }
    Ok(table)
}

/// Load the ring database: Site List, Length and New Ring, plus pass-through sheets
pub fn reconcile_and_load(mut raw: RawWorkbook, config: &Config) -> Result<Database, EngineError> {
    let site_list = non_empty(
        load_sheet(&mut raw, sheets::SITE_LIST, &schema::SITE_LIST, config)?,
        sheets::SITE_LIST,
    )?;
    let length = non_empty(
        load_sheet(&mut raw, sheets::LENGTH, &schema::LENGTH, config)?,
        sheets::LENGTH,
    )?;
    let rings = non_empty(
        load_sheet(&mut raw, sheets::NEW_RING, &schema::RING, config)?,
        sheets::NEW_RING,
    )?;

    let unused = raw
        .sheets
        .into_iter()
        .map(|(name, table)| {
            log::debug!("Sheet '{}' passed through", name);
            (name, schema::sanitize(table, config.sanitize.preview_rows))
        })
        .collect();

    Ok(Database {
        site_list,
        length,
        rings,
        unused,
    })
}

/// Load a work order. New Ring and Insert Ring may not both be empty.
pub fn load_work_order(mut raw: RawWorkbook, config: &Config) -> Result<WorkOrder, EngineError> {
    let site_list = load_sheet(&mut raw, sheets::SITE_LIST, &schema::SITE_LIST, config)?;
    let new_ring = load_sheet(&mut raw, sheets::NEW_RING, &schema::RING, config)?;
    let insert_ring = load_sheet(&mut raw, sheets::INSERT_RING, &schema::RING, config)?;
    let del_segment = load_sheet(&mut raw, sheets::DEL_SEGMENT, &schema::FREE_FORM, config)?;

    if new_ring.is_empty() && insert_ring.is_empty() {
        return Err(EngineError::missing_dataset(format!(
            "{} / {}",
            sheets::NEW_RING,
            sheets::INSERT_RING
        )));
    }

    Ok(WorkOrder {
        site_list,
        new_ring,
        insert_ring,
        del_segment,
    })
}

/// Load an insertion-test ring list
pub fn load_ring_list(mut raw: RawWorkbook, config: &Config) -> Result<RingList, EngineError> {
    let site_list = load_sheet(&mut raw, sheets::SITE_LIST, &schema::SITE_LIST, config)?;
    let insert_ring = non_empty(
        load_sheet(&mut raw, sheets::INSERT_RING, &schema::RING_LIST, config)?,
        sheets::INSERT_RING,
    )?;
    Ok(RingList {
        site_list,
        insert_ring,
    })
}

/// Load a drop request list from the first sheet, with the looser drop threshold
pub fn load_drop_list(mut raw: RawWorkbook, config: &Config) -> Result<DropList, EngineError> {
    let (name, table) = raw
        .take_first()
        .ok_or_else(|| EngineError::missing_dataset(sheets::DROP_SITE))?;
    log::info!("Drop requests read from sheet '{}'", name);
    let requests = bind(
        table,
        &schema::DROP_LIST,
        sheets::DROP_SITE,
        config,
        config.thresholds.drop_site,
    )?;
    Ok(DropList {
        requests: non_empty(requests, sheets::DROP_SITE)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::sanitize::placeholder;
    use crate::table::Value;

    fn sheet(columns: &[&str], rows: &[&[&str]]) -> Table {
        let rows = rows
            .iter()
            .map(|r| r.iter().map(|c| Value::from(*c)).collect())
            .collect();
        Table::from_rows(columns.iter().copied(), rows)
    }

    fn database_workbook() -> RawWorkbook {
        RawWorkbook::new(vec![
            (
                "Site list ".into(),
                sheet(&["Site ID IOH", "Site Name"], &[&["A", "Alpha"]]),
            ),
            (
                "Notes".into(),
                sheet(&["Remark"], &[&["keep me"]]),
            ),
            (
                "Length".into(),
                sheet(&["Ring ID", "#of Site"], &[&["R1", "1"]]),
            ),
            (
                "New Ring".into(),
                sheet(
                    &["Ring Id", "Origin Site ID", "Destination"],
                    &[&["R1", "A", "B"]],
                ),
            ),
        ])
    }

    #[test]
    fn test_load_database_with_fuzzy_names() {
        let db = reconcile_and_load(database_workbook(), &Config::default()).unwrap();
        assert_eq!(db.site_list.cell(0, "Site Name"), &Value::from("Alpha"));
        assert!(db.rings.has_column("Ring ID"));
        assert_eq!(db.unused.len(), 1);
        assert_eq!(db.unused[0].0, "Notes");
    }

    #[test]
    fn test_missing_sheet_is_schema_failure() {
        let mut raw = database_workbook();
        raw.sheets.retain(|(n, _)| n != "Length");
        let err = reconcile_and_load(raw, &Config::default()).unwrap_err();
        assert_eq!(err, EngineError::schema("workbook", "Length"));
    }

    #[test]
    fn test_empty_dataset_is_missing() {
        let mut raw = database_workbook();
        raw.sheets[2].1 = sheet(&["Ring ID", "#of Site"], &[]);
        let err = reconcile_and_load(raw, &Config::default()).unwrap_err();
        assert_eq!(err, EngineError::missing_dataset("Length"));
    }

    #[test]
    fn test_site_list_needs_an_id_column() {
        let mut raw = database_workbook();
        raw.sheets[0].1 = sheet(&["Site Name"], &[&["Alpha"]]);
        assert!(matches!(
            reconcile_and_load(raw, &Config::default()),
            Err(EngineError::SchemaResolution { .. })
        ));
    }

    #[test]
    fn test_title_block_is_skipped() {
        let mut raw = database_workbook();
        let columns = [placeholder(0), placeholder(1)];
        raw.sheets[0].1 = Table::from_rows(
            columns,
            vec![
                vec![Value::Null, Value::Null],
                vec!["Site ID".into(), "Site Name".into()],
                vec!["A".into(), "Alpha".into()],
            ],
        );
        let db = reconcile_and_load(raw, &Config::default()).unwrap();
        assert_eq!(db.site_list.cell(0, "Site ID"), &Value::from("A"));
    }

    #[test]
    fn test_work_order_needs_ring_rows() {
        let raw = RawWorkbook::new(vec![
            ("Site List".into(), sheet(&["Site ID"], &[])),
            ("New Ring".into(), sheet(&["Ring ID", "Origin Site ID", "Destination"], &[])),
            ("Insert Ring".into(), sheet(&["Ring ID", "Origin Site ID", "Destination"], &[])),
            ("Del Segment".into(), sheet(&["Ring ID"], &[])),
        ]);
        let err = load_work_order(raw, &Config::default()).unwrap_err();
        assert!(matches!(err, EngineError::MissingDataset { .. }));
    }

    #[test]
    fn test_drop_list_reads_first_sheet() {
        let raw = RawWorkbook::new(vec![(
            "Sheet1".into(),
            sheet(&["Site Number", "Ring Number"], &[&["B", "R1"]]),
        )]);
        let list = load_drop_list(raw, &Config::default()).unwrap();
        assert_eq!(list.requests.cell(0, "Site ID"), &Value::from("B"));
        assert_eq!(list.requests.cell(0, "Ring ID"), &Value::from("R1"));
    }
}
