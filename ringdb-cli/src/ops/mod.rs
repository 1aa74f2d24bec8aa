//! Entry contracts: load, update, drop and insertion-test runs
//!
//! Every run takes canonical datasets and returns new datasets plus the
//! run's [`Diagnostics`]. Dataset-level failures abort with an
//! [`EngineError`]; ring-level failures are recorded and the ring skipped.

pub mod drop;
pub mod dummy;
pub mod load;
pub mod update;

use chrono::NaiveDate;

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::error::EngineError;

pub use drop::{DropOutcome, splice_drop};
pub use dummy::{DummyOutcome, generate_insertion_test};
pub use load::{
    Database, DropList, RawWorkbook, RingList, WorkOrder, load_drop_list, load_ring_list,
    load_work_order, reconcile_and_load,
};
pub use update::{UpdateOutcome, splice_update};

/// Inputs shared by every run
#[derive(Debug, Clone)]
pub struct RunContext {
    pub today: NaiveDate,
    pub config: Config,
    /// Version label of the produced database (`v<n>`)
    pub version: String,
}

impl RunContext {
    pub fn new(today: NaiveDate, config: Config) -> Self {
        Self {
            today,
            config,
            version: "v1".to_string(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// `date_updated` / `date_dropped` stamp
    pub fn stamp(&self) -> String {
        self.today.format(&self.config.output.date_format).to_string()
    }

    /// Record a ring-scoped error, or hand it back when it must abort the run
    pub(crate) fn isolate(&self, err: EngineError, diags: &mut Diagnostics) -> Result<(), EngineError> {
        let strict = self.config.run.strict_ambiguity
            && matches!(err, EngineError::AmbiguousRingEntry { .. });
        if strict || !err.is_ring_scoped() {
            log::error!("{}", err);
            return Err(err);
        }
        diags.record(&err);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::table::{Table, Value};

    pub fn ctx() -> RunContext {
        let today = NaiveDate::from_ymd_opt(2025, 7, 2).unwrap_or_default();
        RunContext::new(today, Config::default())
    }

    pub fn site_list(ids: &[&str]) -> Table {
        let rows = ids
            .iter()
            .map(|id| {
                vec![
                    Value::from(*id),
                    Value::from(*id),
                    Value::from(format!("Name {}", id)),
                    Value::from("SoW-1"),
                    Value::Float(106.0),
                    Value::Float(-6.0),
                    Value::Null,
                    Value::Null,
                ]
            })
            .collect();
        Table::from_rows(
            [
                "Site ID",
                "Site ID IOH",
                "Site Name",
                "SoW",
                "Long",
                "Lat",
                "date_updated",
                "No",
            ],
            rows,
        )
    }

    pub fn length(rings: &[(&str, i64, f64)]) -> Table {
        let rows = rings
            .iter()
            .map(|(r, n, d)| {
                vec![
                    Value::from(*r),
                    Value::Int(*n),
                    Value::Float(*d),
                    Value::Null,
                    Value::from("ZTE"),
                    Value::from("existing"),
                    Value::Null,
                    Value::Null,
                ]
            })
            .collect();
        Table::from_rows(
            [
                "Ring ID",
                "#of Site",
                "FO Distance (Meter)",
                "AVG Length",
                "Vendor",
                "Ring Status",
                "date_updated",
                "No",
            ],
            rows,
        )
    }

    pub const RING_COLUMNS: [&str; 11] = [
        "Ring ID",
        "Origin Site ID",
        "Destination",
        "Link Name",
        "Total Distance (m)",
        "Vendor",
        "Priority_1",
        "Priority_2",
        "Existing/New Site_1",
        "date_updated",
        "No",
    ];

    /// Edge rows `(ring, origin, destination, distance, priority_1, priority_2, status_1)`
    pub fn rings(edges: &[(&str, &str, &str, f64, &str, &str, &str)]) -> Table {
        let rows = edges
            .iter()
            .map(|(r, o, d, dist, p1, p2, s1)| {
                vec![
                    Value::from(*r),
                    Value::from(*o),
                    Value::from(*d),
                    Value::from(format!("{}-{}", o, d)),
                    Value::Float(*dist),
                    Value::from("ZTE"),
                    Value::from(*p1),
                    Value::from(*p2),
                    Value::from(*s1),
                ]
            })
            .collect();
        Table::from_rows(RING_COLUMNS, rows)
    }

    pub fn database(sites: Table, length: Table, rings: Table) -> Database {
        Database {
            site_list: sites,
            length,
            rings,
            unused: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::ctx;
    use super::*;

    #[test]
    fn test_isolate_policy() {
        let mut diags = Diagnostics::new();
        let ambiguous = EngineError::AmbiguousRingEntry {
            ring_id: "R1".into(),
            count: 2,
        };
        assert!(ctx().isolate(ambiguous.clone(), &mut diags).is_ok());
        assert_eq!(diags.len(), 1);

        let mut strict = ctx();
        strict.config = strict.config.with_strict_ambiguity(true);
        assert!(strict.isolate(ambiguous, &mut diags).is_err());
        assert!(ctx().isolate(EngineError::missing_dataset("Length"), &mut diags).is_err());
    }

    #[test]
    fn test_stamp_uses_configured_format() {
        let mut c = ctx();
        assert_eq!(c.stamp(), "20250702");
        c.config.output.date_format = "%Y-%m-%d".into();
        assert_eq!(c.stamp(), "2025-07-02");
    }
}
