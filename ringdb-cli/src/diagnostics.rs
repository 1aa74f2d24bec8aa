//! Structured skip log collected during a run
//!
//! Per-ring failures never abort a run; they are recorded here and shipped
//! with the result (Not Found Rings sheet, `--skip-log` CSV, `--json`).

use serde::Serialize;

use crate::error::EngineError;
use crate::table::{Table, Value};

/// What kind of skip or warning an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Ring or site could not be anchored; skipped
    UnresolvedAnchor,
    /// Length table holds duplicate rows for the ring; ring left untouched
    AmbiguousRingEntry,
    /// Attribute missing, default substituted
    MissingAttribute,
    /// Requested site or ring is not in the database
    NotFound,
}

impl std::fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticKind::UnresolvedAnchor => write!(f, "UnresolvedAnchor"),
            DiagnosticKind::AmbiguousRingEntry => write!(f, "AmbiguousRingEntry"),
            DiagnosticKind::MissingAttribute => write!(f, "MissingAttribute"),
            DiagnosticKind::NotFound => write!(f, "NotFound"),
        }
    }
}

/// One skip-log entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub ring_id: Option<String>,
    pub site_id: Option<String>,
    pub reason: String,
}

/// Ordered collection of skip-log entries
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        ring_id: Option<&str>,
        site_id: Option<&str>,
        reason: impl Into<String>,
    ) {
        let entry = Diagnostic {
            kind,
            ring_id: ring_id.map(str::to_string),
            site_id: site_id.map(str::to_string),
            reason: reason.into(),
        };
        log::warn!(
            "[{}] ring={} site={} {}",
            entry.kind,
            entry.ring_id.as_deref().unwrap_or("-"),
            entry.site_id.as_deref().unwrap_or("-"),
            entry.reason
        );
        self.entries.push(entry);
    }

    /// Record a ring-scoped engine error
    pub fn record(&mut self, err: &EngineError) {
        match err {
            EngineError::AmbiguousRingEntry { ring_id, .. } => self.push(
                DiagnosticKind::AmbiguousRingEntry,
                Some(ring_id),
                None,
                err.to_string(),
            ),
            EngineError::UnresolvedAnchor {
                ring_id,
                site_id,
                reason,
            } => self.push(
                DiagnosticKind::UnresolvedAnchor,
                Some(ring_id),
                site_id.as_deref(),
                reason.clone(),
            ),
            EngineError::MissingAttribute { ring_id, .. } => self.push(
                DiagnosticKind::MissingAttribute,
                Some(ring_id),
                None,
                err.to_string(),
            ),
            EngineError::SchemaResolution { .. } | EngineError::MissingDataset { .. } => {
                self.push(DiagnosticKind::NotFound, None, None, err.to_string())
            }
        }
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Entries that caused something to be skipped (excludes substituted defaults)
    pub fn skips(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|e| e.kind != DiagnosticKind::MissingAttribute)
    }

    /// "Not Found Rings" sheet: Ring ID, Reason
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(["Ring ID", "Site ID", "Kind", "Reason"]);
        for entry in self.skips() {
            table.push_row(vec![
                Value::from(entry.ring_id.clone()),
                Value::from(entry.site_id.clone()),
                Value::from(entry.kind.to_string()),
                Value::from(entry.reason.clone()),
            ]);
        }
        table
    }

    /// Write every entry as CSV
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["kind", "ring_id", "site_id", "reason"])?;
        for entry in &self.entries {
            wtr.write_record([
                entry.kind.to_string().as_str(),
                entry.ring_id.as_deref().unwrap_or(""),
                entry.site_id.as_deref().unwrap_or(""),
                entry.reason.as_str(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
