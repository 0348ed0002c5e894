//! MetadataProvider trait definition.
//!
//! The MetadataProvider trait abstracts over per-database-engine metadata
//! sources. A provider answers either in per-object mode (one row stream
//! per scoped table) or in bulk mode (one catalog-wide stream per metadata
//! kind); `is_bulk` tells the scanner which family to drive.

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::types::{
    CollectionRow, ColumnRow, ConstraintRow, IndexColumnRow, IndexRow, TableScope,
};
use crate::error::{ProviderError, ProviderResult};

/// A lazy stream of metadata rows.
///
/// End of stream is the end-of-data sentinel; errors mid-stream abort the
/// consuming scan task.
pub type MetadataStream<'a, T> = BoxStream<'a, ProviderResult<T>>;

/// Capability interface implemented once per supported database engine.
///
/// Only the family matching [`is_bulk`](Self::is_bulk) needs overriding;
/// the other family's defaults return [`ProviderError::Unsupported`].
/// Bulk streams must arrive pre-sorted by (schema, table) — index-column
/// streams by (schema, table, index) — because the scanner stitches them
/// with single-pass sequential matchers.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Whether this provider answers catalog-wide bulk queries.
    fn is_bulk(&self) -> bool {
        false
    }

    /// List every table and view of the catalog. Called once per scan.
    async fn collections(&self, catalog: &str) -> ProviderResult<MetadataStream<'_, CollectionRow>>;

    // =========================================================================
    // Per-object family (one scoped stream per table)
    // =========================================================================

    /// Columns of one table.
    async fn columns(&self, scope: &TableScope) -> ProviderResult<MetadataStream<'_, ColumnRow>> {
        let _ = scope;
        Err(ProviderError::Unsupported("per-object columns"))
    }

    /// Indexes of one table.
    async fn indexes(&self, scope: &TableScope) -> ProviderResult<MetadataStream<'_, IndexRow>> {
        let _ = scope;
        Err(ProviderError::Unsupported("per-object indexes"))
    }

    /// Index columns of one table, sorted by index name.
    async fn index_columns(
        &self,
        scope: &TableScope,
    ) -> ProviderResult<MetadataStream<'_, IndexColumnRow>> {
        let _ = scope;
        Err(ProviderError::Unsupported("per-object index columns"))
    }

    /// Constraints of one table.
    async fn constraints(
        &self,
        scope: &TableScope,
    ) -> ProviderResult<MetadataStream<'_, ConstraintRow>> {
        let _ = scope;
        Err(ProviderError::Unsupported("per-object constraints"))
    }

    // =========================================================================
    // Bulk family (one catalog-wide stream per metadata kind)
    // =========================================================================

    /// Columns of every table, sorted by (schema, table).
    async fn columns_bulk(&self, catalog: &str) -> ProviderResult<MetadataStream<'_, ColumnRow>> {
        let _ = catalog;
        Err(ProviderError::Unsupported("bulk columns"))
    }

    /// Indexes of every table, sorted by (schema, table).
    async fn indexes_bulk(&self, catalog: &str) -> ProviderResult<MetadataStream<'_, IndexRow>> {
        let _ = catalog;
        Err(ProviderError::Unsupported("bulk indexes"))
    }

    /// Index columns of every table, sorted by (schema, table, index).
    async fn index_columns_bulk(
        &self,
        catalog: &str,
    ) -> ProviderResult<MetadataStream<'_, IndexColumnRow>> {
        let _ = catalog;
        Err(ProviderError::Unsupported("bulk index columns"))
    }

    /// Constraints of every table, sorted by (schema, table).
    async fn constraints_bulk(
        &self,
        catalog: &str,
    ) -> ProviderResult<MetadataStream<'_, ConstraintRow>> {
        let _ = catalog;
        Err(ProviderError::Unsupported("bulk constraints"))
    }

    // =========================================================================
    // Best-effort
    // =========================================================================

    /// Approximate record count of one table.
    ///
    /// Failures are reported as scan warnings, never as scan errors.
    async fn records_count(&self, scope: &TableScope) -> ProviderResult<Option<u64>> {
        let _ = scope;
        Ok(None)
    }
}
