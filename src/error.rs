//! Error types for metadata providers and catalog scans.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::model::Catalog;
use crate::scan::ScanWarning;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result type for scan-side operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised by a metadata provider.
///
/// Concrete providers live outside this crate; `Backend` is the catch-all
/// for engine-specific failures (driver errors, SQL errors, network).
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Engine-specific failure, already rendered to a message.
    #[error("provider backend error: {0}")]
    Backend(String),

    /// I/O failure while talking to the database.
    #[error("provider I/O error: {0}")]
    Io(#[from] io::Error),

    /// The provider does not implement this access mode.
    ///
    /// Per-object providers return this from the bulk family and vice
    /// versa; the scanner never calls the wrong family, so seeing this
    /// error means a provider misreports `is_bulk`.
    #[error("unsupported provider operation: {0}")]
    Unsupported(&'static str),
}

impl ProviderError {
    /// Create a backend error from any displayable value.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Errors that abort a catalog scan.
///
/// Every variant carries the identifying context (table/column/index name)
/// of the failing sub-operation; the task runner aggregates them all into
/// a [`TaskErrors`] rather than short-circuiting on the first.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A provider call failed; `context` names the operation and object.
    #[error("{context}: {source}")]
    Provider {
        context: String,
        #[source]
        source: ProviderError,
    },

    /// The caller's deadline expired between row reads.
    #[error("deadline exceeded while {context}")]
    DeadlineExceeded { context: String },

    /// A foreign key names a table the provider never listed.
    #[error(
        "constraint {constraint} on {schema}.{table} references unknown table {ref_schema}.{ref_table}"
    )]
    ReferencedTableNotFound {
        constraint: String,
        schema: String,
        table: String,
        ref_schema: String,
        ref_table: String,
    },

    /// A metadata row names a table absent from the collection list.
    #[error("{kind} row for unknown table {schema}.{table}")]
    UnknownTable {
        kind: &'static str,
        schema: String,
        table: String,
    },

    /// An index-column row names an index absent from its table.
    #[error("index-column row for unknown index {index} on {schema}.{table}")]
    UnknownIndex {
        schema: String,
        table: String,
        index: String,
    },

    /// A constraint row is missing a required field.
    #[error("malformed constraint {constraint} on {schema}.{table}: {reason}")]
    MalformedConstraint {
        constraint: String,
        schema: String,
        table: String,
        reason: &'static str,
    },
}

impl ScanError {
    /// Wrap a provider error with the context of the failing operation.
    pub fn provider(context: impl Into<String>, source: ProviderError) -> Self {
        Self::Provider {
            context: context.into(),
            source,
        }
    }
}

/// Aggregate of every task error from one scan.
///
/// Never empty. `Display` lists each failure so a caller sees the full
/// blast radius of a failed scan, not just the first casualty.
#[derive(Debug)]
pub struct TaskErrors(Vec<ScanError>);

impl TaskErrors {
    /// Build from a non-empty error list.
    ///
    /// # Panics
    ///
    /// Panics if `errors` is empty; callers check before constructing.
    pub fn new(errors: Vec<ScanError>) -> Self {
        assert!(!errors.is_empty(), "TaskErrors requires at least one error");
        Self(errors)
    }

    /// The collected errors, in task-completion order.
    pub fn errors(&self) -> &[ScanError] {
        &self.0
    }

    /// Number of failed tasks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for clippy's sake.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another aggregate into this one.
    pub fn extend(&mut self, other: TaskErrors) {
        self.0.extend(other.0);
    }
}

impl fmt::Display for TaskErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} scan task(s) failed: ", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TaskErrors {}

impl From<ScanError> for TaskErrors {
    fn from(err: ScanError) -> Self {
        Self(vec![err])
    }
}

/// A failed scan: the aggregated errors plus the partially populated
/// catalog for diagnostic inspection.
///
/// The catalog inside a failure is unvalidated and must not be treated as
/// complete.
#[derive(Debug)]
pub struct ScanFailure {
    /// Partial, unvalidated catalog.
    pub catalog: Catalog,
    /// Non-fatal diagnostics gathered before the failure.
    pub warnings: Vec<ScanWarning>,
    /// Every task error from the scan.
    pub errors: TaskErrors,
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scan of catalog {} failed: {}",
            self.catalog.name, self.errors
        )
    }
}

impl std::error::Error for ScanFailure {}
