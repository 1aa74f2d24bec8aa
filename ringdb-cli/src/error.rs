//! Error kinds raised by the reconciliation and splice engine

/// Failure raised while loading or splicing ring datasets
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A required sheet or column could not be matched above threshold
    SchemaResolution { dataset: String, field: String },
    /// A required dataset is absent or empty after loading
    MissingDataset { dataset: String },
    /// More than one Length row carries the same Ring ID
    AmbiguousRingEntry { ring_id: String, count: usize },
    /// No splice point or reconnection could be found
    UnresolvedAnchor {
        ring_id: String,
        site_id: Option<String>,
        reason: String,
    },
    /// A per-row attribute was missing and a default was substituted
    MissingAttribute { ring_id: String, attribute: String },
}

impl EngineError {
    pub fn schema(dataset: impl Into<String>, field: impl Into<String>) -> Self {
        EngineError::SchemaResolution {
            dataset: dataset.into(),
            field: field.into(),
        }
    }

    pub fn missing_dataset(dataset: impl Into<String>) -> Self {
        EngineError::MissingDataset {
            dataset: dataset.into(),
        }
    }

    pub fn unresolved(
        ring_id: impl Into<String>,
        site_id: Option<&str>,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::UnresolvedAnchor {
            ring_id: ring_id.into(),
            site_id: site_id.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Errors confined to one ring; the run skips that ring and continues
    pub fn is_ring_scoped(&self) -> bool {
        matches!(
            self,
            EngineError::AmbiguousRingEntry { .. }
                | EngineError::UnresolvedAnchor { .. }
                | EngineError::MissingAttribute { .. }
        )
    }

    /// Short name of the error kind, used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::SchemaResolution { .. } => "SchemaResolutionFailure",
            EngineError::MissingDataset { .. } => "MissingDataset",
            EngineError::AmbiguousRingEntry { .. } => "AmbiguousRingEntry",
            EngineError::UnresolvedAnchor { .. } => "UnresolvedAnchor",
            EngineError::MissingAttribute { .. } => "MissingAttribute",
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SchemaResolution { dataset, field } => {
                write!(f, "'{}' could not be resolved in {}", field, dataset)
            }
            EngineError::MissingDataset { dataset } => {
                write!(f, "Dataset '{}' is missing or empty", dataset)
            }
            EngineError::AmbiguousRingEntry { ring_id, count } => write!(
                f,
                "Multiple entries found for Ring ID {} ({} rows in Length)",
                ring_id, count
            ),
            EngineError::UnresolvedAnchor {
                ring_id,
                site_id: Some(site),
                reason,
            } => write!(f, "Ring {} / site {}: {}", ring_id, site, reason),
            EngineError::UnresolvedAnchor {
                ring_id,
                site_id: None,
                reason,
            } => write!(f, "Ring {}: {}", ring_id, reason),
            EngineError::MissingAttribute { ring_id, attribute } => write!(
                f,
                "Ring {}: attribute '{}' missing, default substituted",
                ring_id, attribute
            ),
        }
    }
}

impl std::error::Error for EngineError {}
