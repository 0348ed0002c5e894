//! Catalog scanning.
//!
//! The scanner turns provider row streams into the catalog graph in two
//! phases per strategy: a concurrent fetch phase (tasks only read from the
//! provider and return rows) and, after the join barrier, a sequential
//! stitch phase that is the only writer of the catalog. This keeps the
//! graph lock-free even when a constraint row mutates a sibling table's
//! `ReferencedBy` list.

mod constraints;
mod deadline;
mod matchers;
mod runner;
mod scanner;

pub use constraints::ConstraintProcessor;
pub use deadline::Deadline;
pub use matchers::{IndexKey, SortedIndexes, SortedTables, TableKey};
pub use runner::join_tasks;
pub use scanner::{ScanOutcome, Schemer};

use std::fmt;

/// A non-fatal diagnostic from a scan, collected into a side list so
/// callers (and tests) can assert on it.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanWarning {
    /// A best-effort record count could not be fetched.
    RecordCount {
        schema: String,
        table: String,
        message: String,
    },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordCount {
                schema,
                table,
                message,
            } => write!(f, "record count unavailable for {schema}.{table}: {message}"),
        }
    }
}
