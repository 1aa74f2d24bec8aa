//! Site decommissioning
//!
//! Each request removes one site from one ring, bridging its neighbours,
//! and moves the site's registry rows to the Drop Site record.

use serde::Serialize;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::EngineError;
use crate::ring::{RingChain, remove_site, summarize, summary_row, upsert_summary};
use crate::schema::canonical::{length, ring, ring_list, sheets, site};
use crate::schema::{align_columns, resolve};
use crate::table::{Table, Value};

use super::RunContext;
use super::load::{Database, DropList};

/// Row counts of a drop run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DropCounts {
    pub requests: usize,
    pub sites_dropped: usize,
    pub rings_reconnected: usize,
    pub not_found: usize,
}

/// Result of [`splice_drop`]
#[derive(Debug, Clone)]
pub struct DropOutcome {
    pub database: Database,
    /// Removed registry rows stamped with `date_dropped`
    pub dropped: Table,
    /// Dropped rows were appended to an existing Drop Site sheet of the database
    pub merged: bool,
    pub diagnostics: Diagnostics,
    pub counts: DropCounts,
}

/// Registry rows listing `site_id` under Site ID or Site ID IOH
fn registry_positions(registry: &Table, site_id: &str) -> Vec<usize> {
    let mut positions = registry.positions_with_key(site::SITE_ID, site_id);
    for p in registry.positions_with_key(site::SITE_ID_IOH, site_id) {
        if !positions.contains(&p) {
            positions.push(p);
        }
    }
    positions.sort_unstable();
    positions
}

/// Remove the requested sites from the database
pub fn splice_drop(
    mut db: Database,
    list: &DropList,
    ctx: &RunContext,
) -> Result<DropOutcome, EngineError> {
    let stamp = ctx.stamp();
    let mut diags = Diagnostics::new();
    let mut counts = DropCounts::default();

    let mut dropped = db.site_list.empty_like();
    dropped.add_column(site::DATE_DROPPED);
    db.length.add_column(length::DATE_UPDATED);
    db.rings.add_column(ring::DATE_UPDATED);

    let requests = &list.requests;
    for p in 0..requests.len() {
        counts.requests += 1;
        let site_id = requests.cell(p, ring_list::SITE_ID).key();
        let ring_id = requests.cell(p, ring_list::RING_ID).key();
        let (Some(site_id), Some(ring_id)) = (site_id, ring_id) else {
            diags.push(DiagnosticKind::NotFound, None, None, format!("row {} has no site or ring id", p + 1));
            counts.not_found += 1;
            continue;
        };

        let listed = registry_positions(&db.site_list, &site_id);
        if listed.is_empty() {
            diags.push(
                DiagnosticKind::NotFound,
                Some(&ring_id),
                Some(&site_id),
                "site not found in the site list",
            );
            counts.not_found += 1;
            continue;
        }

        if RingChain::new(&db.rings).contains_ring(&ring_id) {
            if let Err(err) = summary_row(&db.length, &ring_id) {
                ctx.isolate(err, &mut diags)?;
                continue;
            }
            match remove_site(&mut db.rings, &ring_id, &site_id, &stamp) {
                Ok(_) => {
                    counts.rings_reconnected += 1;
                    if let Err(err) = upsert_summary(&mut db.length, &summarize(&db.rings, &ring_id), &stamp) {
                        ctx.isolate(err, &mut diags)?;
                    }
                }
                Err(err) => ctx.isolate(err, &mut diags)?,
            }
        } else {
            diags.push(
                DiagnosticKind::NotFound,
                Some(&ring_id),
                Some(&site_id),
                "ring not found in New Ring",
            );
        }

        for &row in &listed {
            let mut record = db.site_list.row(row).map(|r| r.to_vec()).unwrap_or_default();
            record.push(Value::from(stamp.as_str()));
            dropped.push_row(record);
        }
        db.site_list.remove_rows(&listed);
        log::info!("Site {} removed from the site list", site_id);
        counts.sites_dropped += 1;
    }

    db.site_list.renumber(site::NO);
    db.length.renumber(length::NO);
    db.rings.renumber(ring::NO);
    let merged = merge_drop_record(&mut db.unused, &dropped, ctx);

    log::info!(
        "Drop done: {} request(s), {} site(s) dropped, {} ring(s) reconnected, {} not found",
        counts.requests,
        counts.sites_dropped,
        counts.rings_reconnected,
        counts.not_found
    );
    Ok(DropOutcome {
        database: db,
        dropped,
        merged,
        diagnostics: diags,
        counts,
    })
}

/// Append dropped rows to a pass-through Drop Site sheet, if the database has one
fn merge_drop_record(unused: &mut [(String, Table)], dropped: &Table, ctx: &RunContext) -> bool {
    let names: Vec<String> = unused.iter().map(|(n, _)| n.clone()).collect();
    let Some(hit) = resolve(sheets::DROP_SITE, &names, ctx.config.thresholds.drop_site) else {
        return false;
    };
    let Some((_, record)) = unused.iter_mut().find(|(n, _)| n == hit.name) else {
        return false;
    };
    let mapping = align_columns(record.columns(), dropped.columns(), ctx.config.thresholds.column);
    for row in dropped.rows() {
        let aligned = mapping
            .iter()
            .map(|m| m.and_then(|c| row.get(c)).cloned().unwrap_or_default())
            .collect();
        record.push_row(aligned);
    }
    log::info!("{} dropped site(s) appended to sheet '{}'", dropped.len(), hit.name);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fixtures::{ctx, database, length, rings, site_list};
    use crate::ring::chain::fixtures::links;

    fn requests(pairs: &[(&str, &str)]) -> DropList {
        DropList {
            requests: Table::from_rows(
                ["Site ID", "Ring ID"],
                pairs
                    .iter()
                    .map(|(s, r)| vec![Value::from(*s), Value::from(*r)])
                    .collect(),
            ),
        }
    }

    fn base() -> Database {
        database(
            site_list(&["A", "B", "C", "D"]),
            length(&[("R1", 3, 200.0)]),
            rings(&[
                ("R1", "A", "B", 120.0, "", "", ""),
                ("R1", "B", "C", 80.0, "", "", ""),
                ("R1", "C", "D", 5.0, "", "", ""),
            ]),
        )
    }

    #[test]
    fn test_drop_reconnects_and_updates_length() {
        let out = splice_drop(base(), &requests(&[("B", "R1")]), &ctx()).unwrap();
        assert_eq!(
            links(&out.database.rings, "R1"),
            vec![("A".into(), "C".into()), ("C".into(), "D".into())]
        );
        assert_eq!(out.database.length.cell(0, "#of Site"), &Value::Int(1));
        assert_eq!(out.database.length.cell(0, "FO Distance (Meter)"), &Value::Float(205.0));
        assert_eq!(out.database.site_list.len(), 3);
        assert_eq!(out.dropped.len(), 1);
        assert_eq!(out.dropped.cell(0, "date_dropped"), &Value::from("20250702"));
        assert_eq!(out.counts.rings_reconnected, 1);
    }

    #[test]
    fn test_unknown_site_is_logged() {
        let before = base();
        let out = splice_drop(before.clone(), &requests(&[("Z", "R1")]), &ctx()).unwrap();
        assert_eq!(links(&out.database.rings, "R1"), links(&before.rings, "R1"));
        assert_eq!(out.counts.not_found, 1);
        assert_eq!(out.diagnostics.count(DiagnosticKind::NotFound), 1);
        assert!(out.dropped.is_empty());
        assert!(!out.merged);
    }

    #[test]
    fn test_site_not_in_ring_still_leaves_registry() {
        let mut db = base();
        db.site_list = site_list(&["A", "B", "C", "D", "E"]);
        let out = splice_drop(db, &requests(&[("E", "R1")]), &ctx()).unwrap();
        assert_eq!(out.diagnostics.count(DiagnosticKind::UnresolvedAnchor), 1);
        assert_eq!(links(&out.database.rings, "R1").len(), 3);
        assert!(registry_positions(&out.database.site_list, "E").is_empty());
    }

    #[test]
    fn test_ambiguous_length_keeps_site() {
        let mut db = base();
        db.length = length(&[("R1", 3, 200.0), ("R1", 3, 200.0)]);
        let out = splice_drop(db, &requests(&[("B", "R1")]), &ctx()).unwrap();
        assert_eq!(links(&out.database.rings, "R1").len(), 3);
        assert_eq!(out.database.site_list.len(), 4);
        assert_eq!(out.diagnostics.count(DiagnosticKind::AmbiguousRingEntry), 1);
    }

    #[test]
    fn test_dropped_rows_join_existing_sheet() {
        let mut db = base();
        db.unused.push((
            "Drop site".into(),
            Table::from_rows(["Site ID", "date_dropped"], vec![vec!["OLD".into(), "20240101".into()]]),
        ));
        let out = splice_drop(db, &requests(&[("D", "R1")]), &ctx()).unwrap();
        let (_, record) = &out.database.unused[0];
        assert_eq!(record.len(), 2);
        assert_eq!(record.cell(1, "Site ID"), &Value::from("D"));
        assert!(out.merged);
        assert_eq!(
            links(&out.database.rings, "R1").last(),
            Some(&("C".to_string(), "D".to_string()))
        );
    }
}
