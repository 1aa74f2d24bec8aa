//! Ring chain model and splice engine

pub mod aggregate;
pub mod anchor;
pub mod chain;
pub mod splice;

pub use aggregate::{
    RingSummary, SiteSource, Upsert, is_registered, segment_count, summarize, summary_row,
    sync_registry, upsert_summary,
};
pub use anchor::{AnchorCase, SplitPlan, find_anchors, plan_split};
pub use chain::{Edge, RingChain, ring_id_columns, stamp_ring_id};
pub use splice::{
    EdgeSources, Insertion, Reconnection, connection_chain, priority_tag, registry_row,
    remove_site, splice_ring, synthesize_insertion,
};
