//! Per-ring aggregates and site registry synchronisation

use std::collections::HashSet;

use serde::Serialize;

use crate::error::EngineError;
use crate::schema::canonical::{labels, length, ring, site};
use crate::table::{Table, Value};

use super::chain::RingChain;

/// Segments of a ring with `edges` edges
pub fn segment_count(edges: usize) -> usize {
    match edges {
        0 => 0,
        n => (n - 1).max(1),
    }
}

/// Recomputed summary of one ring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingSummary {
    pub ring_id: String,
    pub edges: usize,
    pub segments: usize,
    pub total_distance: f64,
    /// `None` when the ring has no segments
    pub average_length: Option<f64>,
    pub vendor: Value,
    pub ring_status: Value,
}

/// Summarise a ring from its current edges
pub fn summarize(edges: &Table, ring_id: &str) -> RingSummary {
    let chain = RingChain::new(edges);
    let positions = chain.positions_for_ring(ring_id);
    let total_distance: f64 = positions.iter().map(|&p| chain.edge_at(p).distance).sum();
    let segments = segment_count(positions.len());
    let first_filled = |column: &str| {
        positions
            .iter()
            .map(|&p| edges.cell(p, column))
            .find(|v| !v.is_empty())
            .cloned()
            .unwrap_or_default()
    };

    RingSummary {
        ring_id: ring_id.to_string(),
        edges: positions.len(),
        segments,
        total_distance,
        average_length: (segments > 0).then(|| total_distance / segments as f64),
        vendor: first_filled(ring::VENDOR),
        ring_status: first_filled(ring::RING_STATUS),
    }
}

/// Position of the ring's single Length row, if any
pub fn summary_row(summaries: &Table, ring_id: &str) -> Result<Option<usize>, EngineError> {
    let matches = summaries.positions_with_key(length::RING_ID, ring_id);
    match matches.as_slice() {
        [] => Ok(None),
        [one] => Ok(Some(*one)),
        many => Err(EngineError::AmbiguousRingEntry {
            ring_id: ring_id.to_string(),
            count: many.len(),
        }),
    }
}

/// What [`upsert_summary`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Updated,
    Appended,
}

/// Write a ring summary into the Length table.
///
/// An existing row keeps its Ring Status; more than one row for the ring
/// is an error and leaves the table untouched.
pub fn upsert_summary(
    summaries: &mut Table,
    summary: &RingSummary,
    stamp: &str,
) -> Result<Upsert, EngineError> {
    let existing = summary_row(summaries, &summary.ring_id)?;
    let (row, outcome) = match existing {
        Some(row) => (row, Upsert::Updated),
        None => {
            summaries.push_row(Vec::new());
            let row = summaries.len() - 1;
            summaries.set(row, length::RING_ID, summary.ring_id.as_str());
            summaries.set(row, length::RING_STATUS, summary.ring_status.clone());
            (row, Upsert::Appended)
        }
    };

    summaries.set(row, length::SEGMENTS, summary.segments as i64);
    summaries.set(row, length::FO_DISTANCE, summary.total_distance);
    summaries.set(row, length::AVG_LENGTH, summary.average_length);
    if !summary.vendor.is_empty() {
        summaries.set(row, length::VENDOR, summary.vendor.clone());
    }
    summaries.set(row, length::DATE_UPDATED, stamp);
    log::debug!(
        "Length {:?} for ring {}: {} segment(s), {:.2} m",
        outcome,
        summary.ring_id,
        summary.segments,
        summary.total_distance
    );
    Ok(outcome)
}

/// A prior site listing consulted when registering a site
#[derive(Debug, Clone, Copy)]
pub struct SiteSource<'a> {
    pub table: &'a Table,
}

impl SiteSource<'_> {
    fn find(&self, site_id: &str) -> Option<usize> {
        super::splice::registry_row(self.table, site_id)
    }
}

/// Whether a site id is listed under Site ID or Site ID IOH
pub fn is_registered(registry: &Table, site_id: &str) -> bool {
    super::splice::registry_row(registry, site_id).is_some()
}

/// Add every edge endpoint missing from the registry.
///
/// Attributes of a new row come from the first source listing the site,
/// then from the edge that references it, then from defaults. Existing
/// rows are never touched. Returns the ids that were added.
pub fn sync_registry(
    registry: &mut Table,
    edges: &Table,
    sources: &[SiteSource<'_>],
    default_kind: &str,
    stamp: &str,
) -> Vec<String> {
    let chain = RingChain::new(edges);
    let mut added = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for position in 0..edges.len() {
        let edge = chain.edge_at(position);
        let sides = [
            (edge.origin, ring::ORIGIN_NAME, ring::LONG_1, ring::LAT_1),
            (edge.destination, ring::DESTINATION_NAME, ring::LONG_2, ring::LAT_2),
        ];
        for (id, name_col, long_col, lat_col) in sides {
            let Some(id) = id else { continue };
            if !seen.insert(id.clone()) || is_registered(registry, &id) {
                continue;
            }

            let mut row = vec![Value::Null; registry.columns().len()];
            let prior = sources.iter().find_map(|s| s.find(&id).map(|r| (s.table, r)));
            if let Some((table, r)) = prior {
                for (c, column) in registry.columns().iter().enumerate() {
                    row[c] = table.cell(r, column).clone();
                }
            } else {
                log::debug!("Site {} has no prior listing, using defaults", id);
            }

            let kind = edges
                .cell(position, ring::RING_STATUS)
                .clone()
                .or(Value::from(default_kind));
            let fill = [
                (site::SITE_NAME, edges.cell(position, name_col).clone()),
                (site::LONG, edges.cell(position, long_col).clone()),
                (site::LAT, edges.cell(position, lat_col).clone()),
                (site::PROGRAM_STATUS, Value::from(labels::NEW_SITE)),
                (site::RING_KIND, kind),
            ];
            for (column, value) in fill {
                if let Some(c) = registry.column_index(column) {
                    if row[c].is_empty() {
                        row[c] = value;
                    }
                }
            }
            for column in [site::SITE_ID, site::SITE_ID_IOH] {
                if let Some(c) = registry.column_index(column) {
                    row[c] = Value::from(id.as_str());
                }
            }
            if let Some(c) = registry.column_index(site::DATE_UPDATED) {
                row[c] = Value::from(stamp);
            }

            log::info!("Site {} added to the site list", id);
            registry.push_row(row);
            added.push(id);
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::chain::fixtures::ring_table;
    use proptest::prelude::*;

    fn length_table(rings: &[&str]) -> Table {
        let rows = rings
            .iter()
            .map(|r| vec![Value::from(*r), Value::Int(9), Value::from("existing")])
            .collect();
        Table::from_rows(
            ["Ring ID", "#of Site", "Ring Status", "FO Distance (Meter)", "AVG Length", "Vendor", "date_updated"],
            rows,
        )
    }

    #[test]
    fn test_segment_count_floor() {
        assert_eq!(segment_count(0), 0);
        assert_eq!(segment_count(1), 1);
        assert_eq!(segment_count(2), 1);
        assert_eq!(segment_count(5), 4);
    }

    #[test]
    fn test_summarize_ring() {
        let edges = ring_table(&[
            ("R1", "A", "B", 100.0),
            ("R2", "X", "Y", 7.0),
            ("R1", "B", "C", 50.0),
            ("R1", "C", "A", 30.0),
        ]);
        let summary = summarize(&edges, "R1");
        assert_eq!(summary.edges, 3);
        assert_eq!(summary.segments, 2);
        assert_eq!(summary.total_distance, 180.0);
        assert_eq!(summary.average_length, Some(90.0));
        assert_eq!(summary.vendor, Value::from("ZTE"));

        let missing = summarize(&edges, "R9");
        assert_eq!(missing.segments, 0);
        assert_eq!(missing.average_length, None);
    }

    #[test]
    fn test_upsert_updates_single_row_and_keeps_status() {
        let mut lengths = length_table(&["R1", "R2"]);
        let edges = ring_table(&[("R1", "A", "B", 10.0), ("R1", "B", "C", 20.0)]);
        let outcome = upsert_summary(&mut lengths, &summarize(&edges, "R1"), "20250701").unwrap();
        assert_eq!(outcome, Upsert::Updated);
        assert_eq!(lengths.len(), 2);
        assert_eq!(lengths.cell(0, "#of Site"), &Value::Int(1));
        assert_eq!(lengths.cell(0, "FO Distance (Meter)"), &Value::Float(30.0));
        assert_eq!(lengths.cell(0, "Ring Status"), &Value::from("existing"));
        assert_eq!(lengths.cell(0, "date_updated"), &Value::from("20250701"));
    }

    #[test]
    fn test_upsert_appends_new_ring() {
        let mut lengths = length_table(&["R1"]);
        let edges = ring_table(&[("R5", "A", "B", 10.0)]);
        let outcome = upsert_summary(&mut lengths, &summarize(&edges, "R5"), "20250701").unwrap();
        assert_eq!(outcome, Upsert::Appended);
        assert_eq!(lengths.cell(1, "Ring ID"), &Value::from("R5"));
        assert_eq!(lengths.cell(1, "AVG Length"), &Value::Float(10.0));
    }

    #[test]
    fn test_ambiguous_ring_entry() {
        let mut lengths = length_table(&["R1", "R1"]);
        let before = lengths.clone();
        let edges = ring_table(&[("R1", "A", "B", 10.0)]);
        let err = upsert_summary(&mut lengths, &summarize(&edges, "R1"), "20250701").unwrap_err();
        assert_eq!(
            err,
            EngineError::AmbiguousRingEntry {
                ring_id: "R1".into(),
                count: 2
            }
        );
        assert_eq!(lengths, before);
    }

    fn registry() -> Table {
        Table::new(["Site ID", "Site ID IOH", "Site Name", "SoW", "Program Status", "insert/new ring", "date_updated"])
    }

    #[test]
    fn test_sync_registry_inherits_from_sources() {
        let mut reg = registry();
        reg.push_row(vec!["A".into(), "A".into(), "Existing A".into()]);
        let prior = Table::from_rows(
            ["Site ID IOH", "SoW", "Site Name"],
            vec![vec!["B".into(), "FO".into(), "Listed B".into()]],
        );
        let edges = ring_table(&[("R1", "A", "B", 1.0), ("R1", "B", "C", 1.0)]);

        let added = sync_registry(
            &mut reg,
            &edges,
            &[SiteSource { table: &prior }],
            labels::INSERT_RING,
            "20250701",
        );
        assert_eq!(added, vec!["B", "C"]);
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.cell(1, "SoW"), &Value::from("FO"));
        assert_eq!(reg.cell(1, "Site Name"), &Value::from("Listed B"));
        assert_eq!(reg.cell(2, "Program Status"), &Value::from("New Site"));
        assert_eq!(reg.cell(2, "insert/new ring"), &Value::from("insert ring"));
        assert_eq!(reg.cell(0, "Site Name"), &Value::from("Existing A"));
    }

    fn arb_ring() -> impl Strategy<Value = Vec<(String, String, String, f64)>> {
        prop::collection::vec(
            ("R[1-3]", "S[0-9]{1,2}", "S[0-9]{1,2}", 0.0f64..1000.0),
            1..30,
        )
    }

    proptest! {
        #[test]
        fn prop_every_endpoint_is_registered(edges in arb_ring()) {
            let refs: Vec<(&str, &str, &str, f64)> = edges
                .iter()
                .map(|(r, o, d, x)| (r.as_str(), o.as_str(), d.as_str(), *x))
                .collect();
            let table = ring_table(&refs);
            let mut reg = registry();
            sync_registry(&mut reg, &table, &[], labels::NEW_RING, "20250701");

            for (_, o, d, _) in &edges {
                prop_assert!(is_registered(&reg, o));
                prop_assert!(is_registered(&reg, d));
            }
            let ids = reg.unique_keys("Site ID");
            prop_assert_eq!(ids.len(), reg.len());
        }

        #[test]
        fn prop_segments_follow_edge_count(edges in arb_ring()) {
            let refs: Vec<(&str, &str, &str, f64)> = edges
                .iter()
                .map(|(r, o, d, x)| (r.as_str(), o.as_str(), d.as_str(), *x))
                .collect();
            let table = ring_table(&refs);
            for ring_id in RingChain::new(&table).ring_ids() {
                let summary = summarize(&table, &ring_id);
                if summary.edges > 1 {
                    prop_assert_eq!(summary.segments, summary.edges - 1);
                } else {
                    prop_assert_eq!(summary.segments, 1);
                }
            }
        }
    }
}
