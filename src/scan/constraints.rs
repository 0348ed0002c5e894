//! Constraint processing.
//!
//! Folds a flat stream of constraint rows into structured primary keys,
//! alternate keys and foreign keys, and maintains the reverse
//! `ReferencedBy` edge on the referenced table in the same step as the
//! forward edge, so the bidirectional invariant holds incrementally and
//! never needs a second consistency pass.
//!
//! Multi-column constraints arrive as adjacent rows sharing one constraint
//! name; the fold merges a row into the table's most recently added key of
//! the same name and kind, and starts a new key otherwise.

use crate::error::{ScanError, ScanResult};
use crate::model::{Catalog, CollectionKey, ForeignKey, ForeignKeyColumn, UniqueKey};
use crate::provider::{ConstraintKind, ConstraintRow};

/// Folds constraint rows into a catalog.
///
/// Runs strictly sequentially: a foreign-key row mutates both its own
/// table and the referenced table, so this is the one scan stage that is
/// never parallelized.
#[derive(Debug)]
pub struct ConstraintProcessor {
    catalog_name: String,
}

impl ConstraintProcessor {
    pub fn new(catalog_name: impl Into<String>) -> Self {
        Self {
            catalog_name: catalog_name.into(),
        }
    }

    /// Apply one constraint row to the catalog.
    pub fn process(&mut self, catalog: &mut Catalog, row: &ConstraintRow) -> ScanResult<()> {
        if catalog.table(&row.schema, &row.table).is_none() {
            return Err(ScanError::UnknownTable {
                kind: "constraint",
                schema: row.schema.clone(),
                table: row.table.clone(),
            });
        }

        match row.kind {
            ConstraintKind::PrimaryKey => self.apply_primary_key(catalog, row),
            ConstraintKind::Unique => self.apply_unique(catalog, row),
            ConstraintKind::ForeignKey => self.apply_foreign_key(catalog, row),
        }
    }

    /// Create the table's primary key on first sight, else append.
    ///
    /// A key pre-derived from pk-tagged columns has an empty name; the
    /// first constraint row names it, and columns it already lists are not
    /// duplicated.
    fn apply_primary_key(&mut self, catalog: &mut Catalog, row: &ConstraintRow) -> ScanResult<()> {
        let table = catalog
            .table_mut(&row.schema, &row.table)
            .unwrap_or_else(|| unreachable!("existence checked in process"));

        let pk = table.primary_key.get_or_insert_with(|| UniqueKey {
            name: String::new(),
            columns: Vec::new(),
        });
        if pk.name.is_empty() {
            pk.name = row.name.clone();
        }
        if !pk.columns.contains(&row.column) {
            pk.columns.push(row.column.clone());
        }
        Ok(())
    }

    /// Adjacency-merge into the most recent alternate key of the same
    /// name, else start a new one.
    fn apply_unique(&mut self, catalog: &mut Catalog, row: &ConstraintRow) -> ScanResult<()> {
        let table = catalog
            .table_mut(&row.schema, &row.table)
            .unwrap_or_else(|| unreachable!("existence checked in process"));

        match table.alternate_keys.last_mut() {
            Some(key) if key.name == row.name => {
                if !key.columns.contains(&row.column) {
                    key.columns.push(row.column.clone());
                }
            }
            _ => table.alternate_keys.push(UniqueKey {
                name: row.name.clone(),
                columns: vec![row.column.clone()],
            }),
        }
        Ok(())
    }

    /// Apply a foreign-key row to both ends of the edge.
    fn apply_foreign_key(&mut self, catalog: &mut Catalog, row: &ConstraintRow) -> ScanResult<()> {
        let ref_column = row
            .ref_column
            .as_deref()
            .ok_or_else(|| self.malformed(row, "missing referenced column"))?;
        let pair = ForeignKeyColumn {
            name: row.column.clone(),
            references: ref_column.to_string(),
        };
        let source_key = CollectionKey::new(
            self.catalog_name.clone(),
            row.schema.clone(),
            row.table.clone(),
        );

        // Adjacency merge onto the table's most recent foreign key; a new
        // name starts a new edge, whose target must already be cataloged.
        let merge_target = catalog
            .table(&row.schema, &row.table)
            .and_then(|t| t.foreign_keys.last())
            .filter(|fk| fk.name == row.name)
            .map(|fk| fk.references.clone());

        let target_key = match merge_target {
            Some(key) => key,
            None => {
                let ref_schema = row
                    .ref_schema
                    .as_deref()
                    .ok_or_else(|| self.malformed(row, "missing referenced schema"))?;
                let ref_table = row
                    .ref_table
                    .as_deref()
                    .ok_or_else(|| self.malformed(row, "missing referenced table"))?;
                if catalog.table(ref_schema, ref_table).is_none() {
                    return Err(ScanError::ReferencedTableNotFound {
                        constraint: row.name.clone(),
                        schema: row.schema.clone(),
                        table: row.table.clone(),
                        ref_schema: ref_schema.to_string(),
                        ref_table: ref_table.to_string(),
                    });
                }
                CollectionKey::new(self.catalog_name.clone(), ref_schema, ref_table)
            }
        };

        {
            let table = catalog
                .table_mut(&row.schema, &row.table)
                .unwrap_or_else(|| unreachable!("existence checked in process"));
            match table.foreign_keys.last_mut() {
                Some(fk) if fk.name == row.name => fk.columns.push(pair.clone()),
                _ => table.foreign_keys.push(ForeignKey {
                    name: row.name.clone(),
                    columns: vec![pair.clone()],
                    references: target_key.clone(),
                    on_update: row.on_update,
                    on_delete: row.on_delete,
                }),
            }
        }

        // Mirror the column pair onto the referenced table's back-edge.
        let target = catalog
            .table_mut(&target_key.schema, &target_key.name)
            .unwrap_or_else(|| unreachable!("target existence checked above"));
        target
            .referenced_by_mut(&source_key)
            .foreign_key_mut(&row.name)
            .columns
            .push(pair);

        Ok(())
    }

    fn malformed(&self, row: &ConstraintRow, reason: &'static str) -> ScanError {
        ScanError::MalformedConstraint {
            constraint: row.name.clone(),
            schema: row.schema.clone(),
            table: row.table.clone(),
            reason,
        }
    }
}
