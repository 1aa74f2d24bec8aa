//! Fiber-ring topology database maintenance
//!
//! The database is a workbook with a site registry (Site List), one summary
//! row per ring (Length) and an ordered edge list (New Ring). Work orders,
//! drop requests and insertion tests are reconciled against the canonical
//! schema, spliced into the ring chains, and written back as a new workbook.

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod excel;
pub mod naming;
pub mod ops;
pub mod ring;
pub mod schema;
pub mod table;

pub use config::Config;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::EngineError;
pub use ops::{
    Database, DropList, RawWorkbook, RingList, RunContext, WorkOrder, generate_insertion_test,
    load_drop_list, load_ring_list, load_work_order, reconcile_and_load, splice_drop,
    splice_update,
};
pub use table::{Table, Value};
