//! Edge synthesis and ring reassembly
//!
//! Insertion builds the connection chain `[near, site_1, .., site_n, far]` and
//! emits one edge per consecutive pair. Removal replaces every edge touching
//! a dropped site with a single reconnecting edge.

use std::collections::HashMap;

use crate::diagnostics::Diagnostics;
use crate::error::EngineError;
use crate::schema::align_columns;
use crate::schema::canonical::{labels, ring, site};
use crate::table::{Table, Value};

use super::anchor::SplitPlan;
use super::chain::{RingChain, stamp_ring_id};

/// Per-site cable columns as they appear after header de-duplication
mod cable {
    pub const EXISTING: [&str; 2] = ["Existing Cable (m)", "Existing Cable (m)_1"];
    pub const NEW: [&str; 2] = ["New Cable (m)", "New Cable (m)_1"];
    pub const EXISTING_OUT: &str = "Existing Cable (m)_2";
    pub const NEW_OUT: &str = "New Cable (m)_2";
}

/// `[near, sites.., far]`
pub fn connection_chain(near_end: &str, sites: &[String], far_end: &str) -> Vec<String> {
    let mut chain = Vec::with_capacity(sites.len() + 2);
    chain.push(near_end.to_string());
    chain.extend(sites.iter().cloned());
    chain.push(far_end.to_string());
    chain
}

/// Priority tag of an endpoint of a synthesized edge
pub fn priority_tag(endpoint: &str, near_end: &str, far_end: &str, inserted: &[String]) -> &'static str {
    let is_anchor = endpoint == near_end || endpoint == far_end;
    if is_anchor && !inserted.iter().any(|s| s == endpoint) {
        labels::ACCESS
    } else {
        labels::INSERT_SITE
    }
}

/// One ordered multi-site insertion between two anchors
#[derive(Debug, Clone)]
pub struct Insertion {
    pub ring_id: String,
    pub near_end: String,
    pub far_end: String,
    /// Inserted site ids with their row in the insertion source, in chain order
    pub sites: Vec<(String, usize)>,
}

impl Insertion {
    pub fn site_ids(&self) -> Vec<String> {
        self.sites.iter().map(|(id, _)| id.clone()).collect()
    }
}

/// Tables a synthesized edge draws attributes from
#[derive(Debug, Clone, Copy)]
pub struct EdgeSources<'a> {
    /// Insertion source rows (one per inserted site)
    pub source: &'a Table,
    /// Existing site registry, used for anchor names and coordinates
    pub registry: &'a Table,
    pub threshold: f64,
    /// `date_updated` stamp
    pub stamp: &'a str,
}

/// Registry row of a site, matched on Site ID IOH then Site ID
pub fn registry_row(registry: &Table, site_id: &str) -> Option<usize> {
    [site::SITE_ID_IOH, site::SITE_ID]
        .iter()
        .find_map(|col| registry.positions_with_key(col, site_id).first().copied())
}

fn first_present(table: &Table, row: usize, columns: &[&str]) -> Value {
    columns
        .iter()
        .map(|c| table.cell(row, c))
        .find(|v| !v.is_empty())
        .cloned()
        .unwrap_or_default()
}

/// Build the edge rows of an insertion, laid out in `columns`
pub fn synthesize_insertion(
    columns: &[String],
    insertion: &Insertion,
    sources: &EdgeSources<'_>,
    diags: &mut Diagnostics,
) -> Vec<Vec<Value>> {
    let inserted = insertion.site_ids();
    let rows: HashMap<&str, usize> = insertion
        .sites
        .iter()
        .map(|(id, row)| (id.as_str(), *row))
        .collect();
    let chain = connection_chain(&insertion.near_end, &inserted, &insertion.far_end);
    let mapping = align_columns(columns, sources.source.columns(), sources.threshold);

    let name_of = |id: &str| -> Value {
        match rows.get(id) {
            Some(&r) => sources.source.cell(r, site::SITE_NAME).clone(),
            None => registry_row(sources.registry, id)
                .map(|r| sources.registry.cell(r, site::SITE_NAME).clone())
                .unwrap_or_default(),
        }
    };
    let coords_of = |id: &str| -> (Value, Value) {
        match rows.get(id) {
            Some(&r) => (
                first_present(sources.source, r, &[site::LONG, ring::LONG_1]),
                first_present(sources.source, r, &[site::LAT, ring::LAT_1]),
            ),
            None => registry_row(sources.registry, id)
                .map(|r| {
                    (
                        sources.registry.cell(r, site::LONG).clone(),
                        sources.registry.cell(r, site::LAT).clone(),
                    )
                })
                .unwrap_or_default(),
        }
    };

    let mut edges = Vec::with_capacity(chain.len().saturating_sub(1));
    for pair in chain.windows(2) {
        let (origin, destination) = (pair[0].as_str(), pair[1].as_str());

        // the inserted site this edge belongs to
        let owner = rows.get(destination).or_else(|| rows.get(origin)).copied();

        let (existing, new) = match (rows.get(destination), rows.get(origin)) {
            (Some(&r), _) => (
                first_present(sources.source, r, &cable::EXISTING),
                first_present(sources.source, r, &cable::NEW),
            ),
            (None, Some(&r)) => (
                sources.source.cell(r, cable::EXISTING_OUT).clone(),
                sources.source.cell(r, cable::NEW_OUT).clone(),
            ),
            (None, None) => (Value::Null, Value::Null),
        };
        let total = match (existing.as_f64(), new.as_f64()) {
            (Some(e), Some(n)) => e + n,
            _ => {
                diags.record(&EngineError::MissingAttribute {
                    ring_id: insertion.ring_id.clone(),
                    attribute: format!("cable length {}-{}", origin, destination),
                });
                0.0
            }
        };

        let mut row: Vec<Value> = match owner {
            Some(r) => mapping
                .iter()
                .map(|m| {
                    m.and_then(|c| sources.source.row(r).and_then(|cells| cells.get(c)))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect(),
            None => vec![Value::Null; columns.len()],
        };

        let owner_value = |column: &str, default: &str| -> Value {
            owner
                .map(|r| sources.source.cell(r, column).clone())
                .unwrap_or_default()
                .or(Value::from(default))
        };
        let (long_1, lat_1) = coords_of(origin);
        let (long_2, lat_2) = coords_of(destination);

        let assigned: Vec<(&str, Value)> = vec![
            (ring::ORIGIN, Value::from(origin)),
            (ring::DESTINATION, Value::from(destination)),
            (ring::LINK_NAME, Value::from(format!("{}-{}", origin, destination))),
            (ring::ORIGIN_NAME, name_of(origin)),
            (ring::DESTINATION_NAME, name_of(destination)),
            (ring::EXISTING_CABLE, Value::Float(existing.as_f64().unwrap_or(0.0))),
            (ring::NEW_CABLE, Value::Float(new.as_f64().unwrap_or(0.0))),
            (ring::TOTAL_DISTANCE, Value::Float(total)),
            (
                ring::VENDOR,
                owner
                    .map(|r| sources.source.cell(r, ring::VENDOR).clone())
                    .unwrap_or_default(),
            ),
            (
                ring::PRIORITY_1,
                Value::from(priority_tag(origin, &insertion.near_end, &insertion.far_end, &inserted)),
            ),
            (
                ring::PRIORITY_2,
                Value::from(priority_tag(destination, &insertion.near_end, &insertion.far_end, &inserted)),
            ),
            (ring::LONG_1, long_1),
            (ring::LAT_1, lat_1),
            (ring::LONG_2, long_2),
            (ring::LAT_2, lat_2),
            (ring::SITE_STATUS_1, owner_value(ring::SITE_STATUS_1, labels::NEW_SITE)),
            (ring::SITE_STATUS_2, owner_value(ring::SITE_STATUS_2, labels::NEW_SITE)),
            (ring::RING_STATUS, owner_value(ring::RING_STATUS, labels::NEW_RING)),
            (ring::DATE_UPDATED, Value::from(sources.stamp)),
        ];
        for (column, value) in assigned {
            if let Some(c) = columns.iter().position(|n| n == column) {
                row[c] = value;
            }
        }
        stamp_ring_id(columns, &mut row, &insertion.ring_id);
        edges.push(row);
    }
    edges
}

/// `top ++ new ++ bottom` over a ring's current rows
pub fn reassemble(ring_rows: &[Vec<Value>], plan: &SplitPlan, new_rows: Vec<Vec<Value>>) -> Vec<Vec<Value>> {
    let mut out = Vec::with_capacity(plan.top().len() + new_rows.len() + plan.bottom().len());
    out.extend(ring_rows.get(plan.top()).unwrap_or_default().iter().cloned());
    out.extend(new_rows);
    out.extend(ring_rows.get(plan.bottom()).unwrap_or_default().iter().cloned());
    out
}

/// Splice new rows into a ring of the edge table.
///
/// The reassembled ring takes the place of the ring's first row; a ring
/// that does not exist yet is appended. The plan must have been computed on
/// the ring's current edges; a plan of another length is rejected and the
/// table is left as it was.
pub fn splice_ring(
    table: &mut Table,
    ring_id: &str,
    plan: &SplitPlan,
    new_rows: Vec<Vec<Value>>,
) -> Result<(), EngineError> {
    let positions = RingChain::new(table).positions_for_ring(ring_id);
    if positions.len() != plan.len {
        return Err(EngineError::unresolved(
            ring_id,
            None,
            format!(
                "split plan covers {} edge(s) but the ring has {}",
                plan.len,
                positions.len()
            ),
        ));
    }
    let current: Vec<Vec<Value>> = positions
        .iter()
        .filter_map(|&p| table.row(p).map(|r| r.to_vec()))
        .collect();
    let rebuilt = reassemble(&current, plan, new_rows);
    log::debug!(
        "Ring {}: {} edge(s) -> {} edge(s) ({})",
        ring_id,
        current.len(),
        rebuilt.len(),
        plan.case
    );
    table.replace_rows(&positions, rebuilt);
    Ok(())
}

/// How a dropped site was bridged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconnection {
    /// Inbound origin joined to outbound destination
    Full,
    /// Only an inbound edge existed; it is kept up to the dropped site
    InboundOnly,
    /// Only an outbound edge existed; it is kept from the dropped site
    OutboundOnly,
}

/// Columns describing the destination side of an edge
const DESTINATION_SIDE: [&str; 5] = [
    ring::DESTINATION_NAME,
    ring::LONG_2,
    ring::LAT_2,
    ring::PRIORITY_2,
    ring::SITE_STATUS_2,
];

fn add_cells(a: &Value, b: &Value) -> Value {
    match (a.as_f64(), b.as_f64()) {
        (None, None) => Value::Null,
        (x, y) => Value::Float(x.unwrap_or(0.0) + y.unwrap_or(0.0)),
    }
}

/// Remove `site` from a ring, replacing its edges with one reconnecting edge.
///
/// The replacement sits at the position of the earliest removed edge; the
/// ring's other edges are untouched.
pub fn remove_site(
    table: &mut Table,
    ring_id: &str,
    site_id: &str,
    stamp: &str,
) -> Result<Reconnection, EngineError> {
    let chain = RingChain::new(table);
    let edges = chain.edges_for_ring(ring_id);
    if edges.is_empty() {
        return Err(EngineError::unresolved(ring_id, Some(site_id), "ring not found"));
    }

    let inbound = edges.iter().find(|e| e.destination.as_deref() == Some(site_id));
    let outbound = edges.iter().find(|e| e.origin.as_deref() == Some(site_id));
    let removed: Vec<usize> = edges
        .iter()
        .filter(|e| e.touches(site_id))
        .map(|e| e.position)
        .collect();

    let (reference, origin, destination, distance, reconnection) = match (inbound, outbound) {
        (Some(i), Some(o)) => (
            i.position,
            i.origin.clone().unwrap_or_default(),
            o.destination.clone().unwrap_or_default(),
            i.distance + o.distance,
            Reconnection::Full,
        ),
        (Some(i), None) => (
            i.position,
            i.origin.clone().unwrap_or_default(),
            site_id.to_string(),
            i.distance,
            Reconnection::InboundOnly,
        ),
        (None, Some(o)) => (
            o.position,
            site_id.to_string(),
            o.destination.clone().unwrap_or_default(),
            o.distance,
            Reconnection::OutboundOnly,
        ),
        (None, None) => {
            return Err(EngineError::unresolved(
                ring_id,
                Some(site_id),
                "no valid connection for site in ring",
            ));
        }
    };

    let mut row = table.row(reference).map(|r| r.to_vec()).unwrap_or_default();
    let mut put = |column: &str, value: Value| {
        if let Some(c) = table.column_index(column) {
            row[c] = value;
        }
    };

    if let (Reconnection::Full, Some(o)) = (reconnection, outbound) {
        for column in DESTINATION_SIDE {
            put(column, table.cell(o.position, column).clone());
        }
        for column in [ring::EXISTING_CABLE, ring::NEW_CABLE] {
            let sum = add_cells(table.cell(reference, column), table.cell(o.position, column));
            put(column, sum);
        }
    }
    put(ring::ORIGIN, Value::from(origin.as_str()));
    put(ring::DESTINATION, Value::from(destination.as_str()));
    put(ring::LINK_NAME, Value::from(format!("{}-{}", origin, destination)));
    put(ring::TOTAL_DISTANCE, Value::Float(distance));
    put(ring::DATE_UPDATED, Value::from(stamp));

    log::info!(
        "Ring {}: dropped {} -> new connection {} -> {} ({:?})",
        ring_id,
        site_id,
        origin,
        destination,
        reconnection
    );
    table.replace_rows(&removed, vec![row]);
    Ok(reconnection)
}
