//! Schema reconciliation
//!
//! Raw sheets are sanitized and then bound to a fixed canonical schema once
//! per dataset. Everything downstream indexes columns by canonical name and
//! never re-resolves per row.

pub mod canonical;
pub mod reconcile;
pub mod sanitize;

use std::collections::HashSet;

use crate::error::EngineError;
use crate::table::Table;

use canonical::{length, ring, ring_list, site};
pub use reconcile::{DEFAULT_THRESHOLD, Resolved, resolve, resolve_name, similarity};
pub use sanitize::{DEFAULT_PREVIEW_ROWS, dedupe_columns, sanitize};

/// Threshold used for the noisier drop-site inputs
pub const DROP_THRESHOLD: f64 = 0.7;

/// A canonical column of a dataset
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
}

const fn req(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        required: true,
    }
}

const fn opt(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        required: false,
    }
}

/// Canonical field list of one dataset kind
#[derive(Debug, Clone, Copy)]
pub struct SchemaSpec {
    pub fields: &'static [FieldSpec],
}

impl SchemaSpec {
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

/// Site registry. One of Site ID / Site ID IOH must be present.
pub const SITE_LIST: SchemaSpec = SchemaSpec {
    fields: &[
        opt(site::SITE_ID),
        opt(site::SITE_ID_IOH),
        opt(site::SITE_NAME),
        opt(site::PROGRAM_NAME),
        opt(site::PROGRAM_RING),
        opt(site::PROGRAM_STATUS),
        opt(site::RING_KIND),
        opt(site::SOW),
        opt(site::SITE_OWNER),
        opt(site::INITIAL_SITE_ID),
        opt(site::INITIAL_SITE_NAME),
        opt(site::LONG),
        opt(site::LAT),
        opt(site::DATE_UPDATED),
        opt(site::NO),
    ],
};

/// Ring summary table
pub const LENGTH: SchemaSpec = SchemaSpec {
    fields: &[
        req(length::RING_ID),
        opt(length::SEGMENTS),
        opt(length::FO_DISTANCE),
        opt(length::AVG_LENGTH),
        opt(length::VENDOR),
        opt(length::RING_STATUS),
        opt(length::DATE_UPDATED),
        opt(length::NO),
    ],
};

/// Edge list (New Ring / Insert Ring)
pub const RING: SchemaSpec = SchemaSpec {
    fields: &[
        req(ring::RING_ID),
        req(ring::ORIGIN),
        req(ring::DESTINATION),
        opt(ring::ORIGIN_NAME),
        opt(ring::DESTINATION_NAME),
        opt(ring::LINK_NAME),
        opt(ring::TOTAL_DISTANCE),
        opt(ring::EXISTING_CABLE),
        opt(ring::NEW_CABLE),
        opt(ring::VENDOR),
        opt(ring::PRIORITY_1),
        opt(ring::PRIORITY_2),
        opt(ring::LONG_1),
        opt(ring::LAT_1),
        opt(ring::LONG_2),
        opt(ring::LAT_2),
        opt(ring::SITE_STATUS_1),
        opt(ring::SITE_STATUS_2),
        opt(ring::RING_STATUS),
        opt(ring::PROGRAM),
        opt(ring::PROGRAM_RING),
        opt(ring::DATE_UPDATED),
        opt(ring::NO),
    ],
};

/// Insertion-test ring list
pub const RING_LIST: SchemaSpec = SchemaSpec {
    fields: &[
        req(ring_list::RING_ID),
        req(ring_list::SITE_ID),
        req(ring_list::NEAR_END),
        req(ring_list::FAR_END),
    ],
};

/// Drop-site request list
pub const DROP_LIST: SchemaSpec = SchemaSpec {
    fields: &[req(ring_list::SITE_ID), req(ring_list::RING_ID)],
};

/// Sheets that are loaded and counted but not bound
pub const FREE_FORM: SchemaSpec = SchemaSpec { fields: &[] };

/// Bind a sanitized table to `spec`, renaming matched columns to canonical names.
///
/// Exact names are bound first. Remaining fields are resolved fuzzily
/// against columns that are neither claimed nor the exact name of another
/// canonical field, so every canonical field maps to at most one column.
pub fn normalize_schema(
    mut table: Table,
    spec: &SchemaSpec,
    dataset: &str,
    threshold: f64,
) -> Result<Table, EngineError> {
    let canonical: HashSet<&str> = spec.field_names().collect();
    let mut claimed: HashSet<String> = HashSet::new();
    let mut unbound: Vec<&FieldSpec> = Vec::new();

    for field in spec.fields {
        if table.has_column(field.name) {
            claimed.insert(field.name.to_string());
        } else {
            unbound.push(field);
        }
    }

    let mut renames: Vec<(String, &'static str)> = Vec::new();
    for field in unbound {
        let candidates: Vec<&String> = table
            .columns()
            .iter()
            .filter(|c| !claimed.contains(c.as_str()) && !canonical.contains(c.as_str()))
            .collect();

        match resolve(field.name, candidates.iter().copied(), threshold) {
            Some(hit) => {
                log::debug!(
                    "{}: column '{}' bound to '{}' (score {:.2})",
                    dataset,
                    hit.name,
                    field.name,
                    hit.score
                );
                claimed.insert(hit.name.to_string());
                renames.push((hit.name.to_string(), field.name));
            }
            None if field.required => {
                return Err(EngineError::schema(dataset, field.name));
            }
            None => {}
        }
    }

    for (from, to) in renames {
        table.rename_column(&from, to);
    }
    Ok(table)
}

/// Fail unless at least one of `names` is a column of `table`
pub fn require_any(table: &Table, dataset: &str, names: &[&str]) -> Result<(), EngineError> {
    if names.iter().any(|n| table.has_column(n)) {
        return Ok(());
    }
    Err(EngineError::schema(
        dataset,
        names.first().copied().unwrap_or_default(),
    ))
}

/// For every target column, the source column feeding it: exact name, else
/// the best fuzzy match, else none.
pub fn align_columns(target: &[String], source: &[String], threshold: f64) -> Vec<Option<usize>> {
    target
        .iter()
        .map(|col| {
            source.iter().position(|s| s == col).or_else(|| {
                resolve_name(col, source, threshold)
                    .and_then(|name| source.iter().position(|s| s == name))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn ring_table(columns: &[&str]) -> Table {
        let row = columns.iter().map(|c| Value::from(format!("{}-v", c))).collect();
        Table::from_rows(columns.iter().copied(), vec![row])
    }

    #[test]
    fn test_canonical_headers_unchanged() {
        let table = ring_table(&["Ring ID", "Origin Site ID", "Destination", "Vendor"]);
        let normalized = normalize_schema(table.clone(), &RING, "New Ring", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(normalized, table);
    }

    #[test]
    fn test_fuzzy_columns_renamed() {
        let table = ring_table(&["Ring  ID", "Origin Site Id", "Destination", "vendor"]);
        let normalized = normalize_schema(table, &RING, "New Ring", DEFAULT_THRESHOLD).unwrap();
        assert_eq!(
            normalized.columns(),
            &["Ring ID", "Origin Site ID", "Destination", "Vendor"]
        );
        assert_eq!(normalized.cell(0, "Ring ID"), &Value::from("Ring  ID-v"));
    }

    #[test]
    fn test_exact_name_of_other_field_not_stolen() {
        // Site ID is absent; Site ID IOH must not be renamed into it
        let table = ring_table(&["Site ID IOH", "Site Name"]);
        let normalized = normalize_schema(table, &SITE_LIST, "Site List", DEFAULT_THRESHOLD).unwrap();
        assert!(normalized.has_column("Site ID IOH"));
        assert!(!normalized.has_column("Site ID"));
        assert!(require_any(&normalized, "Site List", &[site::SITE_ID, site::SITE_ID_IOH]).is_ok());
    }

    #[test]
    fn test_missing_required_field_fails() {
        let table = ring_table(&["Ring ID", "Destination"]);
        let err = normalize_schema(table, &RING, "New Ring", DEFAULT_THRESHOLD).unwrap_err();
        assert_eq!(err, EngineError::schema("New Ring", "Origin Site ID"));
    }

    #[test]
    fn test_drop_list_uses_lower_threshold() {
        let table = ring_table(&["Site Number", "Ring Number"]);
        assert!(normalize_schema(table.clone(), &DROP_LIST, "Drop", DEFAULT_THRESHOLD).is_err());
        let normalized = normalize_schema(table, &DROP_LIST, "Drop", DROP_THRESHOLD).unwrap();
        assert_eq!(normalized.columns(), &["Site ID", "Ring ID"]);
    }

    #[test]
    fn test_align_columns() {
        let target: Vec<String> = ["No", "Ring ID", "Vendor", "Remarks"].map(String::from).to_vec();
        let source: Vec<String> = ["vendor", "Ring ID"].map(String::from).to_vec();
        assert_eq!(
            align_columns(&target, &source, DEFAULT_THRESHOLD),
            vec![None, Some(1), Some(0), None]
        );
    }
}
