//! Database update from a weekly work order
//!
//! New Ring rows are appended as whole rings; Insert Ring rows are spliced
//! into existing rings between their access anchors. Length rows and the
//! site list follow the resulting chains.

use std::collections::HashSet;

use serde::Serialize;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::EngineError;
use crate::naming::iso_week;
use crate::ring::{
    RingChain, SiteSource, SplitPlan, find_anchors, is_registered, plan_split, registry_row,
    splice_ring, stamp_ring_id, summarize, summary_row, sync_registry, upsert_summary,
};
use crate::schema::align_columns;
use crate::schema::canonical::{labels, length, ring, site, tags};
use crate::table::{Table, Value};

use super::RunContext;
use super::load::{Database, WorkOrder};

/// Row counts of an update run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateCounts {
    pub sites_added: usize,
    pub new_ring_edges: usize,
    pub rings_created: usize,
    pub rings_spliced: usize,
    pub rings_skipped: usize,
}

/// Result of [`splice_update`]
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    pub database: Database,
    /// Two-column key/value report
    pub summary: Table,
    pub diagnostics: Diagnostics,
    pub counts: UpdateCounts,
}

/// Rows of `source` laid out in `target` columns, stamped with their ring and date
fn aligned_rows(
    target: &[String],
    source: &Table,
    positions: &[usize],
    threshold: f64,
    stamp: &str,
) -> Vec<Vec<Value>> {
    let mapping = align_columns(target, source.columns(), threshold);
    let chain = RingChain::new(source);
    positions
        .iter()
        .filter_map(|&p| {
            let cells = source.row(p)?;
            let mut row: Vec<Value> = mapping
                .iter()
                .map(|m| m.and_then(|c| cells.get(c)).cloned().unwrap_or_default())
                .collect();
            if let Some(ring_id) = chain.ring_of(p) {
                stamp_ring_id(target, &mut row, &ring_id);
            }
            if let Some(c) = target.iter().position(|n| n == ring::DATE_UPDATED) {
                row[c] = Value::from(stamp);
            }
            Some(row)
        })
        .collect()
}

/// Register sites flagged on work-order ring rows.
///
/// Attributes come from the row itself, then the work-order Site List, then
/// fuzzy-matched row columns. Sites already listed are skipped.
fn register_flagged_sites(
    registry: &mut Table,
    rows: &Table,
    listing: &Table,
    flagged: impl Fn(&Table, usize) -> bool,
    default_kind: &str,
    ctx: &RunContext,
) -> Vec<String> {
    let stamp = ctx.stamp();
    let mapping = align_columns(registry.columns(), rows.columns(), ctx.config.thresholds.column);
    let mut added = Vec::new();

    for p in 0..rows.len() {
        if !flagged(rows, p) {
            continue;
        }
        let Some(id) = rows.cell(p, ring::ORIGIN).key() else {
            continue;
        };
        if is_registered(registry, &id) {
            log::warn!("Site {} already exists in the site list, skipped", id);
            continue;
        }

        let listed = registry_row(listing, &id);
        let columns = registry.columns().to_vec();
        let mut row: Vec<Value> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let from_row = rows.cell(p, column);
                if !from_row.is_empty() {
                    return from_row.clone();
                }
                let from_listing = listed.map(|r| listing.cell(r, column).clone()).unwrap_or_default();
                if !from_listing.is_empty() {
                    return from_listing;
                }
                mapping[i]
                    .and_then(|c| rows.row(p).and_then(|cells| cells.get(c)))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect();

        let mut assigned = vec![
            (site::SITE_ID, Value::from(id.as_str())),
            (site::SITE_ID_IOH, Value::from(id.as_str())),
            (site::SITE_NAME, rows.cell(p, ring::ORIGIN_NAME).clone()),
            (site::PROGRAM_NAME, rows.cell(p, ring::PROGRAM).clone()),
            (site::PROGRAM_RING, rows.cell(p, ring::PROGRAM_RING).clone()),
            (
                site::PROGRAM_STATUS,
                rows.cell(p, ring::SITE_STATUS_1).clone().or(Value::from(labels::NEW_SITE)),
            ),
            (
                site::RING_KIND,
                rows.cell(p, ring::RING_STATUS).clone().or(Value::from(default_kind)),
            ),
            (site::DATE_UPDATED, Value::from(stamp.as_str())),
        ];
        if let Some(r) = listed {
            for column in site::INHERITED {
                assigned.push((column, listing.cell(r, column).clone()));
            }
        }
        for (column, value) in assigned {
            if let Some(c) = columns.iter().position(|n| n == column) {
                row[c] = value;
            }
        }

        log::info!("Site {} registered from work order", id);
        registry.push_row(row);
        added.push(id);
    }
    added
}

/// One insertion point of a ring's Insert Ring rows
#[derive(Debug, Default)]
struct InsertGroup {
    sites: HashSet<String>,
    near: Vec<String>,
    far: Vec<String>,
    material: Vec<usize>,
}

/// Split a ring's Insert Ring rows into insertion points.
///
/// Rows sharing an inserted site belong to the same point. Rows touching no
/// inserted site describe existing edges and are left out; the ring keeps its
/// own copy of them.
fn insert_groups(rows: &Table, positions: &[usize]) -> Vec<InsertGroup> {
    let chain = RingChain::new(rows);
    let mut inserted: HashSet<String> = HashSet::new();
    for &p in positions {
        let edge = chain.edge_at(p);
        if rows.cell(p, ring::PRIORITY_1).has_tag(tags::INSERT_SITE) {
            inserted.extend(edge.origin.clone());
        }
        if rows.cell(p, ring::PRIORITY_2).has_tag(tags::INSERT_SITE) {
            inserted.extend(edge.destination.clone());
        }
    }

    let mut groups: Vec<InsertGroup> = Vec::new();
    for &p in positions {
        let edge = chain.edge_at(p);
        let touched: Vec<String> = [&edge.origin, &edge.destination]
            .into_iter()
            .flatten()
            .filter(|id| inserted.contains(*id))
            .cloned()
            .collect();
        if touched.is_empty() {
            continue;
        }

        let mut group = InsertGroup::default();
        let mut i = 0;
        while i < groups.len() {
            if touched.iter().any(|s| groups[i].sites.contains(s)) {
                let other = groups.remove(i);
                group.sites.extend(other.sites);
                group.material.extend(other.material);
            } else {
                i += 1;
            }
        }
        group.sites.extend(touched);
        group.material.push(p);
        groups.push(group);
    }

    for group in &mut groups {
        group.material.sort_unstable();
        for &p in &group.material {
            let edge = chain.edge_at(p);
            let is_insert = |id: &Option<String>| id.as_ref().is_some_and(|s| group.sites.contains(s));
            let (from_insert, to_insert) = (is_insert(&edge.origin), is_insert(&edge.destination));
            if to_insert && !from_insert {
                group.near.extend(edge.origin.clone());
            }
            if from_insert && !to_insert {
                group.far.extend(edge.destination.clone());
            }
        }
    }
    groups.sort_by_key(|g| g.material.first().copied());
    groups
}

/// Splice one ring's Insert Ring rows into `table`, one insertion point at a
/// time. Untagged rows replace the ring wholesale. Returns the rows that
/// entered the ring.
fn splice_insert_ring(
    table: &mut Table,
    ring_id: &str,
    rows: &Table,
    positions: &[usize],
    threshold: f64,
    stamp: &str,
) -> Result<Vec<Vec<Value>>, EngineError> {
    let groups = insert_groups(rows, positions);
    if groups.is_empty() {
        log::info!("Ring {}: no insert site tags, replacing the ring", ring_id);
        let new_rows = aligned_rows(table.columns(), rows, positions, threshold, stamp);
        let plan = SplitPlan::whole(RingChain::new(table).positions_for_ring(ring_id).len());
        splice_ring(table, ring_id, &plan, new_rows.clone())?;
        return Ok(new_rows);
    }

    let mut entered = Vec::new();
    for group in &groups {
        let edges = RingChain::new(table).edges_for_ring(ring_id);
        let (start, end) = find_anchors(&edges, &group.near, &group.far);
        let plan = plan_split(edges.len(), start, end);
        let new_rows = aligned_rows(table.columns(), rows, &group.material, threshold, stamp);
        log::info!(
            "Ring {}: splicing {} edge(s) ({})",
            ring_id,
            new_rows.len(),
            plan.case
        );
        entered.extend(new_rows.iter().cloned());
        splice_ring(table, ring_id, &plan, new_rows)?;
    }
    Ok(entered)
}

/// Apply a work order to the database
pub fn splice_update(
    mut db: Database,
    order: &WorkOrder,
    ctx: &RunContext,
) -> Result<UpdateOutcome, EngineError> {
    let stamp = ctx.stamp();
    let threshold = ctx.config.thresholds.column;
    let mut diags = Diagnostics::new();
    let mut counts = UpdateCounts::default();

    db.site_list.add_column(site::DATE_UPDATED);
    db.length.add_column(length::DATE_UPDATED);
    db.rings.add_column(ring::DATE_UPDATED);

    // New Ring: register new sites, append edges, upsert Length
    let new_ring_chain = RingChain::new(&order.new_ring);
    let mut blocked: HashSet<String> = HashSet::new();
    for ring_id in new_ring_chain.ring_ids() {
        if let Err(err) = summary_row(&db.length, &ring_id) {
            ctx.isolate(err, &mut diags)?;
            counts.rings_skipped += 1;
            blocked.insert(ring_id);
        }
    }
    let admitted = |p: usize| new_ring_chain.ring_of(p).is_none_or(|r| !blocked.contains(&r));

    counts.sites_added += register_flagged_sites(
        &mut db.site_list,
        &order.new_ring,
        &order.site_list,
        |t, p| admitted(p) && t.cell(p, ring::SITE_STATUS_1).has_tag(tags::NEW_SITE),
        labels::NEW_RING,
        ctx,
    )
    .len();

    let kept: Vec<usize> = (0..order.new_ring.len()).filter(|&p| admitted(p)).collect();
    let appended = aligned_rows(db.rings.columns(), &order.new_ring, &kept, threshold, &stamp);
    counts.new_ring_edges = appended.len();
    let appended = Table::from_rows(db.rings.columns().to_vec(), appended);
    db.rings.replace_rows(&[], appended.rows().to_vec());

    for ring_id in new_ring_chain.ring_ids() {
        if blocked.contains(&ring_id) {
            continue;
        }
        match upsert_summary(&mut db.length, &summarize(&db.rings, &ring_id), &stamp) {
            Ok(_) => counts.rings_created += 1,
            Err(err) => ctx.isolate(err, &mut diags)?,
        }
    }
    counts.sites_added += sync_registry(
        &mut db.site_list,
        &appended,
        &[SiteSource { table: &order.site_list }],
        labels::NEW_RING,
        &stamp,
    )
    .len();

    // Insert Ring: register insert sites, splice each ring between its anchors
    counts.sites_added += register_flagged_sites(
        &mut db.site_list,
        &order.insert_ring,
        &order.site_list,
        |t, p| {
            t.cell(p, ring::SITE_STATUS_1).has_tag(tags::NEW_SITE)
                && t.cell(p, ring::PRIORITY_1).has_tag(tags::INSERT_SITE)
        },
        labels::INSERT_RING,
        ctx,
    )
    .len();

    let source_chain = RingChain::new(&order.insert_ring);
    let mut inserted = db.rings.empty_like();
    for ring_id in source_chain.ring_ids() {
        if !RingChain::new(&db.rings).contains_ring(&ring_id) {
            diags.push(
                DiagnosticKind::NotFound,
                Some(&ring_id),
                None,
                "ring not found in the database",
            );
            counts.rings_skipped += 1;
            continue;
        }
        if let Err(err) = summary_row(&db.length, &ring_id) {
            ctx.isolate(err, &mut diags)?;
            counts.rings_skipped += 1;
            continue;
        }

        let positions = source_chain.positions_for_ring(&ring_id);
        let mut working = db.rings.clone();
        match splice_insert_ring(&mut working, &ring_id, &order.insert_ring, &positions, threshold, &stamp) {
            Ok(rows) => {
                for row in rows {
                    inserted.push_row(row);
                }
                db.rings = working;
            }
            Err(err) => {
                ctx.isolate(err, &mut diags)?;
                counts.rings_skipped += 1;
                continue;
            }
        }

        match upsert_summary(&mut db.length, &summarize(&db.rings, &ring_id), &stamp) {
            Ok(_) => counts.rings_spliced += 1,
            Err(err) => ctx.isolate(err, &mut diags)?,
        }
    }

    counts.sites_added += sync_registry(
        &mut db.site_list,
        &inserted,
        &[SiteSource { table: &order.site_list }],
        labels::INSERT_RING,
        &stamp,
    )
    .len();
    counts.sites_added += sync_registry(
        &mut db.site_list,
        &db.rings,
        &[SiteSource { table: &order.site_list }],
        labels::NEW_RING,
        &stamp,
    )
    .len();

    db.site_list.renumber(site::NO);
    db.length.renumber(length::NO);
    db.rings.renumber(ring::NO);

    let summary = summary_table(&db, order, ctx);
    log::info!(
        "Update done: {} site(s) added, {} ring(s) created, {} spliced, {} skipped",
        counts.sites_added,
        counts.rings_created,
        counts.rings_spliced,
        counts.rings_skipped
    );

    Ok(UpdateOutcome {
        database: db,
        summary,
        diagnostics: diags,
        counts,
    })
}

fn summary_table(db: &Database, order: &WorkOrder, ctx: &RunContext) -> Table {
    let entries: Vec<(&str, Value)> = vec![
        ("Date", Value::from(ctx.stamp())),
        ("Week", Value::Int(iso_week(ctx.today) as i64)),
        ("Version", Value::from(ctx.version.as_str())),
        ("Total Site List Updated", Value::Int(db.site_list.len() as i64)),
        ("Total Length Updated", Value::Int(db.length.len() as i64)),
        ("Total New Ring Updated", Value::Int(db.rings.len() as i64)),
        ("Del Segment Rows", Value::Int(order.del_segment.len() as i64)),
    ];
    Table::from_rows(
        ["Item", "Value"],
        entries
            .into_iter()
            .map(|(k, v)| vec![Value::from(k), v])
            .collect(),
    )
}
