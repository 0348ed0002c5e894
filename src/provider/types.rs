//! Row types delivered by metadata providers.
//!
//! Bulk providers tag every row with its owning (schema, table) and emit
//! rows pre-sorted by that pair (index-column rows additionally by index
//! name); per-object providers emit rows for exactly the scoped table.

use serde::{Deserialize, Serialize};

use crate::model::{DbObjectType, ReferentialAction};

/// Identifies one table for the per-object provider family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableScope {
    pub catalog: String,
    pub schema: String,
    pub table: String,
}

impl TableScope {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.table)
    }
}

/// One table or view from the collection listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRow {
    pub schema: String,
    pub name: String,
    /// Classifies the row into the schema's tables or views list.
    pub object_type: DbObjectType,
}

/// One column row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Ordinal position (1-based).
    pub ordinal: u32,
    pub type_name: String,
    pub nullable: bool,
    /// Position within the primary key (1-based), if part of it.
    pub pk_ordinal: Option<u32>,
}

/// One index row; its columns arrive separately as [`IndexColumnRow`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Engine type tag ("btree", "hash", ...).
    pub type_tag: String,
    pub unique: bool,
    pub primary: bool,
}

/// One column of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexColumnRow {
    pub schema: String,
    pub table: String,
    pub index: String,
    pub column: String,
    pub descending: bool,
}

/// Constraint classification carried on every constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
}

/// One constraint row: one column of one constraint.
///
/// Multi-column constraints arrive as adjacent rows sharing the constraint
/// name, in column order. Foreign-key rows additionally carry the
/// referenced table/column and the referential actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRow {
    pub schema: String,
    pub table: String,
    /// Constraint name.
    pub name: String,
    pub kind: ConstraintKind,
    /// The owning column this row contributes.
    pub column: String,
    /// Referenced schema; foreign keys only.
    pub ref_schema: Option<String>,
    /// Referenced table; foreign keys only.
    pub ref_table: Option<String>,
    /// Referenced column; foreign keys only.
    pub ref_column: Option<String>,
    pub on_update: ReferentialAction,
    pub on_delete: ReferentialAction,
}

impl ConstraintRow {
    /// A PRIMARY KEY row.
    pub fn primary_key(
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            name: name.into(),
            kind: ConstraintKind::PrimaryKey,
            column: column.into(),
            ref_schema: None,
            ref_table: None,
            ref_column: None,
            on_update: ReferentialAction::NoAction,
            on_delete: ReferentialAction::NoAction,
        }
    }

    /// A UNIQUE row.
    pub fn unique(
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        Self {
            kind: ConstraintKind::Unique,
            ..Self::primary_key(schema, table, name, column)
        }
    }

    /// A FOREIGN KEY row referencing one target column.
    #[allow(clippy::too_many_arguments)]
    pub fn foreign_key(
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        column: impl Into<String>,
        ref_schema: impl Into<String>,
        ref_table: impl Into<String>,
        ref_column: impl Into<String>,
    ) -> Self {
        Self {
            kind: ConstraintKind::ForeignKey,
            ref_schema: Some(ref_schema.into()),
            ref_table: Some(ref_table.into()),
            ref_column: Some(ref_column.into()),
            ..Self::primary_key(schema, table, name, column)
        }
    }
}
