//! Insertion-test ("dummy") database generation
//!
//! Applies a ring list of hypothetical insertions to copies of the affected
//! rings and emits a database holding only those rings, their Length rows
//! and their sites.

use std::collections::HashSet;

use serde::Serialize;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::EngineError;
use crate::ring::{
    EdgeSources, Insertion, RingChain, SiteSource, find_anchors, plan_split, registry_row,
    splice_ring, summarize, summary_row, sync_registry, synthesize_insertion, upsert_summary,
};
use crate::schema::canonical::{labels, length, ring, ring_list, site};
use crate::table::Table;

use super::RunContext;
use super::load::{Database, RingList};

/// Row counts of an insertion-test run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DummyCounts {
    pub rings_requested: usize,
    pub rings_processed: usize,
    pub insertions: usize,
    pub sites_inserted: usize,
    pub rows_rejected: usize,
}

/// Result of [`generate_insertion_test`]
#[derive(Debug, Clone)]
pub struct DummyOutcome {
    /// Processed rings only, plus the source database's pass-through sheets
    pub database: Database,
    /// Skip log rendered as the Not Found Rings sheet
    pub not_found: Table,
    pub diagnostics: Diagnostics,
    pub counts: DummyCounts,
}

/// Request rows of one ring sharing a (Near End, Far End) pair
#[derive(Debug)]
struct Group {
    near_end: Option<String>,
    far_end: Option<String>,
    rows: Vec<usize>,
}

fn group_requests(list: &Table, rows: &[usize]) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();
    for &r in rows {
        let near_end = list.cell(r, ring_list::NEAR_END).key();
        let far_end = list.cell(r, ring_list::FAR_END).key();
        match groups
            .iter_mut()
            .find(|g| g.near_end == near_end && g.far_end == far_end)
        {
            Some(g) => g.rows.push(r),
            None => groups.push(Group {
                near_end,
                far_end,
                rows: vec![r],
            }),
        }
    }
    groups
}

/// Reason a request row cannot be applied, if any
fn rejection(
    list: &Table,
    row: usize,
    endpoints: &HashSet<String>,
    known: impl Fn(&str) -> bool,
) -> Option<String> {
    if list.cell(row, ring_list::SITE_ID).key().is_none() {
        return Some("Site ID is empty".into());
    }
    let near_end = list.cell(row, ring_list::NEAR_END).key();
    let far_end = list.cell(row, ring_list::FAR_END).key();
    let (Some(near_end), Some(far_end)) = (near_end, far_end) else {
        return Some("Near End or Far End is empty".into());
    };
    if !endpoints.contains(&near_end) {
        return Some(format!("Near End {} is not part of the ring", near_end));
    }
    if !known(&near_end) {
        return Some(format!("Near End {} not found in the site list", near_end));
    }
    if !known(&far_end) {
        return Some(format!("Far End {} not found in the site list", far_end));
    }
    None
}

/// Build an insertion-test database from a ring list
pub fn generate_insertion_test(
    db: &Database,
    list: &RingList,
    ctx: &RunContext,
) -> Result<DummyOutcome, EngineError> {
    let stamp = ctx.stamp();
    let mut diags = Diagnostics::new();
    let mut counts = DummyCounts::default();

    let mut template = db.rings.empty_like();
    template.add_column(ring::DATE_UPDATED);
    let mut rings = template.clone();
    let mut lengths = db.length.empty_like();
    lengths.add_column(length::DATE_UPDATED);

    let requests = &list.insert_ring;
    let db_chain = RingChain::new(&db.rings);
    let sources = EdgeSources {
        source: requests,
        registry: &db.site_list,
        threshold: ctx.config.thresholds.column,
        stamp: &stamp,
    };

    for ring_id in requests.unique_keys(ring_list::RING_ID) {
        counts.rings_requested += 1;
        let positions = db_chain.positions_for_ring(&ring_id);
        if positions.is_empty() {
            diags.push(
                DiagnosticKind::NotFound,
                Some(&ring_id),
                None,
                "Ring ID not found in the database",
            );
            continue;
        }
        if let Err(err) = summary_row(&db.length, &ring_id) {
            ctx.isolate(err, &mut diags)?;
            continue;
        }

        let mut working = template.clone();
        for &p in &positions {
            working.push_row(db.rings.row(p).map(|r| r.to_vec()).unwrap_or_default());
        }

        let mut inserted: HashSet<String> = HashSet::new();
        let rows = requests.positions_with_key(ring_list::RING_ID, &ring_id);
        for group in group_requests(requests, &rows) {
            let (edges, endpoints) = {
                let chain = RingChain::new(&working);
                let endpoints: HashSet<String> = chain.endpoints().into_iter().collect();
                (chain.edges_for_ring(&ring_id), endpoints)
            };
            let known = |id: &str| registry_row(&db.site_list, id).is_some() || inserted.contains(id);

            let mut sites = Vec::new();
            for &r in &group.rows {
                match rejection(requests, r, &endpoints, known) {
                    Some(reason) => {
                        let site_id = requests.cell(r, ring_list::SITE_ID).key();
                        diags.push(DiagnosticKind::NotFound, Some(&ring_id), site_id.as_deref(), reason);
                        counts.rows_rejected += 1;
                    }
                    None => {
                        if let Some(id) = requests.cell(r, ring_list::SITE_ID).key() {
                            sites.push((id, r));
                        }
                    }
                }
            }
            let (Some(near_end), Some(far_end)) = (group.near_end, group.far_end) else {
                continue;
            };
            if sites.is_empty() {
                continue;
            }

            let insertion = Insertion {
                ring_id: ring_id.clone(),
                near_end,
                far_end,
                sites,
            };
            let new_rows = synthesize_insertion(working.columns(), &insertion, &sources, &mut diags);
            let (start, end) = find_anchors(&edges, &[&insertion.near_end], &[&insertion.far_end]);
            let plan = plan_split(edges.len(), start, end);
            log::info!(
                "Ring {}: inserting {} between {} and {} ({})",
                ring_id,
                insertion.site_ids().join(", "),
                insertion.near_end,
                insertion.far_end,
                plan.case
            );
            if let Err(err) = splice_ring(&mut working, &ring_id, &plan, new_rows) {
                ctx.isolate(err, &mut diags)?;
                continue;
            }

            counts.insertions += 1;
            counts.sites_inserted += insertion.sites.len();
            inserted.extend(insertion.site_ids());
        }

        if inserted.is_empty() {
            diags.push(
                DiagnosticKind::NotFound,
                Some(&ring_id),
                None,
                "no valid insertion for the ring",
            );
            continue;
        }
        if let Err(err) = upsert_summary(&mut lengths, &summarize(&working, &ring_id), &stamp) {
            ctx.isolate(err, &mut diags)?;
            continue;
        }
        for row in working.rows() {
            rings.push_row(row.clone());
        }
        counts.rings_processed += 1;
    }

    let mut site_list = db.site_list.empty_like();
    site_list.add_column(site::DATE_UPDATED);
    sync_registry(
        &mut site_list,
        &rings,
        &[
            SiteSource { table: &list.site_list },
            SiteSource { table: &db.site_list },
        ],
        labels::NEW_RING,
        &stamp,
    );

    site_list.renumber(site::NO);
    lengths.renumber(length::NO);
    rings.renumber(ring::NO);

    log::info!(
        "Insertion test done: {}/{} ring(s) processed, {} site(s) inserted, {} row(s) rejected",
        counts.rings_processed,
        counts.rings_requested,
        counts.sites_inserted,
        counts.rows_rejected
    );
    Ok(DummyOutcome {
        database: Database {
            site_list,
            length: lengths,
            rings,
            unused: db.unused.clone(),
        },
        not_found: diags.to_table(),
        diagnostics: diags,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::fixtures::{ctx, database, length, rings, site_list};
    use crate::ring::chain::fixtures::links;
    use crate::ring::is_registered;
    use crate::table::Value;

    fn ring_list(rows: &[(&str, &str, &str, &str)]) -> RingList {
        let rows = rows
            .iter()
            .map(|(r, s, ne, fe)| {
                vec![
                    Value::from(*r),
                    Value::from(*s),
                    Value::from(*ne),
                    Value::from(*fe),
                    Value::from(format!("Site {}", s)),
                    Value::Float(10.0),
                    Value::Float(5.0),
                    Value::Float(1.0),
                    Value::Float(2.0),
                ]
            })
            .collect();
        RingList {
            site_list: Table::new(["Site ID", "Site Name"]),
            insert_ring: Table::from_rows(
                [
                    "Ring ID",
                    "Site ID",
                    "Near End",
                    "Far End",
                    "Site Name",
                    "Existing Cable (m)",
                    "New Cable (m)",
                    "Existing Cable (m)_2",
                    "New Cable (m)_2",
                ],
                rows,
            ),
        }
    }

    fn base() -> Database {
        database(
            site_list(&["A", "F", "X", "Y"]),
            length(&[("R1", 2, 6.0), ("R2", 0, 0.0)]),
            rings(&[
                ("R1", "X", "A", 1.0, "", "", ""),
                ("R1", "A", "F", 2.0, "", "", ""),
                ("R1", "F", "Y", 3.0, "", "", ""),
                ("R2", "P", "Q", 4.0, "", "", ""),
            ]),
        )
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(o, d)| (o.to_string(), d.to_string())).collect()
    }

    #[test]
    fn test_multi_site_group_and_rejections() {
        let list = ring_list(&[
            ("R1", "B", "A", "F"),
            ("R1", "C", "A", "F"),
            ("R1", "Z", "Q", "F"),
            ("R9", "K", "A", "F"),
        ]);
        let out = generate_insertion_test(&base(), &list, &ctx()).unwrap();

        assert_eq!(
            links(&out.database.rings, "R1"),
            pairs(&[("X", "A"), ("A", "B"), ("B", "C"), ("C", "F"), ("F", "Y")])
        );
        assert!(links(&out.database.rings, "R2").is_empty());
        assert_eq!(out.database.length.len(), 1);
        assert_eq!(out.database.length.cell(0, "#of Site"), &Value::Int(4));
        assert_eq!(out.database.length.cell(0, "FO Distance (Meter)"), &Value::Float(37.0));
        for id in ["X", "A", "B", "C", "F", "Y"] {
            assert!(is_registered(&out.database.site_list, id), "{} missing", id);
        }
        assert_eq!(out.database.site_list.len(), 6);
        assert_eq!(out.diagnostics.count(DiagnosticKind::NotFound), 2);
        assert_eq!(out.not_found.len(), 2);
        assert_eq!(out.counts.rows_rejected, 1);
        assert_eq!(out.counts.rings_processed, 1);
    }

    #[test]
    fn test_later_groups_see_earlier_insertions() {
        let list = ring_list(&[("R1", "B", "A", "F"), ("R1", "D", "B", "F")]);
        let out = generate_insertion_test(&base(), &list, &ctx()).unwrap();
        assert_eq!(
            links(&out.database.rings, "R1"),
            pairs(&[("X", "A"), ("A", "B"), ("B", "D"), ("D", "F"), ("F", "Y")])
        );
        assert_eq!(out.counts.insertions, 2);
    }

    #[test]
    fn test_near_end_outside_ring_rejects_all() {
        let list = ring_list(&[("R2", "B", "A", "F")]);
        let out = generate_insertion_test(&base(), &list, &ctx()).unwrap();
        assert!(out.database.rings.is_empty());
        assert_eq!(out.counts.rings_processed, 0);
        assert_eq!(out.diagnostics.count(DiagnosticKind::NotFound), 2);
    }

    #[test]
    fn test_ambiguous_length_skips_ring() {
        let mut db = base();
        db.length = length(&[("R1", 2, 6.0), ("R1", 2, 6.0)]);
        let list = ring_list(&[("R1", "B", "A", "F")]);
        let out = generate_insertion_test(&db, &list, &ctx()).unwrap();
        assert!(out.database.rings.is_empty());
        assert_eq!(out.diagnostics.count(DiagnosticKind::AmbiguousRingEntry), 1);
    }
}
