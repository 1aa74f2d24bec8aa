//! Ring chain model over the edge-list table
//!
//! A ring is the ordered subsequence of edge rows sharing a Ring ID. Edges
//! are addressed by their position in the backing table, since splices
//! rebuild contiguous row groups.

use std::collections::HashSet;

use crate::schema::canonical::ring;
use crate::table::{Table, Value};

/// Columns holding the ring identifier: `Ring ID` and its `Ring ID_<n>` duplicates
pub fn ring_id_columns(columns: &[String]) -> Vec<usize> {
    columns
        .iter()
        .enumerate()
        .filter(|(_, c)| is_ring_id_column(c))
        .map(|(i, _)| i)
        .collect()
}

fn is_ring_id_column(name: &str) -> bool {
    if name == ring::RING_ID {
        return true;
    }
    name.strip_prefix(ring::RING_ID)
        .and_then(|rest| rest.strip_prefix('_'))
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

/// One directed link of a ring
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Row position in the backing table
    pub position: usize,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub distance: f64,
}

impl Edge {
    pub fn touches(&self, site: &str) -> bool {
        self.origin.as_deref() == Some(site) || self.destination.as_deref() == Some(site)
    }
}

/// Read-only view of every ring in an edge-list table
#[derive(Debug, Clone)]
pub struct RingChain<'a> {
    table: &'a Table,
    ring_cols: Vec<usize>,
}

impl<'a> RingChain<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            ring_cols: ring_id_columns(table.columns()),
        }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Ring of the row at `position`: first filled Ring ID column
    pub fn ring_of(&self, position: usize) -> Option<String> {
        let row = self.table.row(position)?;
        self.ring_cols
            .iter()
            .find_map(|&c| row.get(c).and_then(Value::key))
    }

    /// Distinct ring ids in first-appearance order
    pub fn ring_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        (0..self.table.len())
            .filter_map(|p| self.ring_of(p))
            .filter(|r| seen.insert(r.clone()))
            .collect()
    }

    /// Table positions of the ring's edges, in chain order
    pub fn positions_for_ring(&self, ring_id: &str) -> Vec<usize> {
        (0..self.table.len())
            .filter(|&p| self.ring_of(p).as_deref() == Some(ring_id))
            .collect()
    }

    pub fn contains_ring(&self, ring_id: &str) -> bool {
        (0..self.table.len()).any(|p| self.ring_of(p).as_deref() == Some(ring_id))
    }

    pub fn edge_at(&self, position: usize) -> Edge {
        Edge {
            position,
            origin: self.table.cell(position, ring::ORIGIN).key(),
            destination: self.table.cell(position, ring::DESTINATION).key(),
            distance: self
                .table
                .cell(position, ring::TOTAL_DISTANCE)
                .as_f64()
                .unwrap_or(0.0),
        }
    }

    /// Ordered edges of one ring
    pub fn edges_for_ring(&self, ring_id: &str) -> Vec<Edge> {
        self.positions_for_ring(ring_id)
            .into_iter()
            .map(|p| self.edge_at(p))
            .collect()
    }

    /// Position of the first edge of `ring_id` with the given endpoints
    pub fn position_of(
        &self,
        ring_id: &str,
        origin: Option<&str>,
        destination: Option<&str>,
    ) -> Option<usize> {
        self.edges_for_ring(ring_id)
            .into_iter()
            .find(|e| {
                origin.is_none_or(|o| e.origin.as_deref() == Some(o))
                    && destination.is_none_or(|d| e.destination.as_deref() == Some(d))
            })
            .map(|e| e.position)
    }

    /// Every site id used as an endpoint anywhere in the table
    pub fn endpoints(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for p in 0..self.table.len() {
            let edge = self.edge_at(p);
            for id in [edge.origin, edge.destination].into_iter().flatten() {
                if seen.insert(id.clone()) {
                    out.push(id);
                }
            }
        }
        out
    }
}

/// Set the ring id on a row in `Ring ID` and every `Ring ID_<n>` column
pub fn stamp_ring_id(columns: &[String], row: &mut [Value], ring_id: &str) {
    for c in ring_id_columns(columns) {
        if let Some(cell) = row.get_mut(c) {
            *cell = Value::from(ring_id);
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub const COLUMNS: [&str; 6] = [
        "Ring ID",
        "Origin Site ID",
        "Destination",
        "Link Name",
        "Total Distance (m)",
        "Vendor",
    ];

    /// Edge-list table from `(ring, origin, destination, distance)` tuples
    pub fn ring_table(edges: &[(&str, &str, &str, f64)]) -> Table {
        let rows = edges
            .iter()
            .map(|(r, o, d, dist)| {
                vec![
                    Value::from(*r),
                    Value::from(*o),
                    Value::from(*d),
                    Value::from(format!("{}-{}", o, d)),
                    Value::Float(*dist),
                    Value::from("ZTE"),
                ]
            })
            .collect();
        Table::from_rows(COLUMNS, rows)
    }

    /// `[(origin, destination)]` of one ring
    pub fn links(table: &Table, ring_id: &str) -> Vec<(String, String)> {
        RingChain::new(table)
            .edges_for_ring(ring_id)
            .into_iter()
            .map(|e| (e.origin.unwrap_or_default(), e.destination.unwrap_or_default()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_edges_for_ring_keep_table_positions() {
        let table = ring_table(&[
            ("R1", "A", "B", 10.0),
            ("R2", "X", "Y", 5.0),
            ("R1", "B", "C", 20.0),
        ]);
        let chain = RingChain::new(&table);
        let edges = chain.edges_for_ring("R1");
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[1].position, 2);
        assert_eq!(edges[1].distance, 20.0);
        assert_eq!(chain.ring_ids(), vec!["R1", "R2"]);
        assert_eq!(chain.position_of("R1", Some("B"), None), Some(2));
        assert_eq!(chain.position_of("R1", None, Some("Y")), None);
    }

    #[test]
    fn test_ring_id_variants() {
        let columns: Vec<String> = ["Ring ID", "Ring ID_1", "Ring ID_x", "Origin Site ID"]
            .map(String::from)
            .to_vec();
        assert_eq!(ring_id_columns(&columns), vec![0, 1]);

        // the canonical column is blank; the duplicate carries the id
        let table = Table::from_rows(
            columns.clone(),
            vec![vec![Value::Null, "R7".into(), Value::Null, "A".into()]],
        );
        assert_eq!(RingChain::new(&table).ring_of(0).as_deref(), Some("R7"));

        let mut row = vec![Value::Null; 4];
        stamp_ring_id(&columns, &mut row, "R9");
        assert_eq!(row[0], Value::from("R9"));
        assert_eq!(row[1], Value::from("R9"));
        assert!(row[2].is_null());
    }
}
