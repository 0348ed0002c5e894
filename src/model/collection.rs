use serde::{Deserialize, Serialize};

use super::index::Index;

/// How the database classifies a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbObjectType {
    /// Base table.
    Table,
    /// View.
    View,
}

/// Global identity of a collection: the (catalog, schema, name) triple.
///
/// Foreign keys and `ReferencedBy` entries store this triple instead of a
/// pointer into the graph; resolve it with [`super::Catalog::table`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionKey {
    pub catalog: String,
    pub schema: String,
    pub name: String,
}

impl CollectionKey {
    pub fn new(
        catalog: impl Into<String>,
        schema: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            catalog: catalog.into(),
            schema: schema.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.catalog, self.schema, self.name)
    }
}

/// A table or view and everything the scan learned about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name.
    pub name: String,

    /// Owning schema name.
    pub schema: String,

    /// Table or view.
    pub object_type: DbObjectType,

    /// Columns in provider order.
    pub columns: Vec<Column>,

    /// Primary key, if the collection has one.
    pub primary_key: Option<UniqueKey>,

    /// Unique constraints other than the primary key.
    pub alternate_keys: Vec<UniqueKey>,

    /// Outgoing foreign-key edges.
    pub foreign_keys: Vec<ForeignKey>,

    /// Incoming foreign-key edges, one entry per referencing collection.
    pub referenced_by: Vec<ReferencedBy>,

    /// Indexes.
    pub indexes: Vec<Index>,

    /// Best-effort record count; absent when the provider could not count.
    pub record_count: Option<u64>,
}

impl Collection {
    /// Create an empty collection shell; the scan phases fill it in.
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        object_type: DbObjectType,
    ) -> Self {
        Self {
            name: name.into(),
            schema: schema.into(),
            object_type,
            columns: Vec::new(),
            primary_key: None,
            alternate_keys: Vec::new(),
            foreign_keys: Vec::new(),
            referenced_by: Vec::new(),
            indexes: Vec::new(),
            record_count: None,
        }
    }

    /// Schema-qualified name.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Identity of this collection within `catalog`.
    pub fn key(&self, catalog: &str) -> CollectionKey {
        CollectionKey::new(catalog, self.schema.clone(), self.name.clone())
    }

    /// Find a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Find an index by name.
    pub fn index_mut(&mut self, name: &str) -> Option<&mut Index> {
        self.indexes.iter_mut().find(|i| i.name == name)
    }

    /// Find or create the `ReferencedBy` entry for a referencing collection.
    pub fn referenced_by_mut(&mut self, source: &CollectionKey) -> &mut ReferencedBy {
        if let Some(pos) = self.referenced_by.iter().position(|r| &r.source == source) {
            return &mut self.referenced_by[pos];
        }
        self.referenced_by.push(ReferencedBy {
            source: source.clone(),
            foreign_keys: Vec::new(),
        });
        self.referenced_by
            .last_mut()
            .unwrap_or_else(|| unreachable!("entry pushed above"))
    }
}

/// A column of a table or view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Ordinal position (1-based).
    pub ordinal: u32,

    /// Engine type name (e.g. "integer", "varchar(40)").
    pub type_name: String,

    /// Whether the column allows NULL.
    pub nullable: bool,

    /// Position within the primary key (1-based), if part of it.
    ///
    /// Defines the primary-key column order in the per-object path.
    pub pk_ordinal: Option<u32>,
}

/// A primary or alternate (unique) key.
///
/// Invariant: the column list is non-empty and free of duplicates; the
/// constraint processor enforces this while folding rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueKey {
    /// Constraint name; empty when derived from pk-tagged columns before
    /// the constraint stream named it.
    pub name: String,

    /// Member column names, in key order.
    pub columns: Vec<String>,
}

/// Referential action on update/delete of the referenced row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    /// Parse an engine-reported action tag; unknown tags mean NO ACTION.
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "RESTRICT" => Self::Restrict,
            "CASCADE" => Self::Cascade,
            "SET NULL" => Self::SetNull,
            "SET DEFAULT" => Self::SetDefault,
            _ => Self::NoAction,
        }
    }
}

/// One source-column → target-column pair of a foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyColumn {
    /// Column on the owning (source) collection.
    pub name: String,
    /// Column on the referenced collection.
    pub references: String,
}

/// An outgoing foreign-key edge.
///
/// For every foreign key on collection A naming collection B, B carries
/// exactly one [`ReferencedBy`] entry keyed by A's identity whose
/// [`RefByForeignKey`] mirrors this key's name and column pairs. The
/// constraint processor maintains both sides in the same step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Constraint name.
    pub name: String,

    /// Column pairs in key order; same cardinality as the referenced key.
    pub columns: Vec<ForeignKeyColumn>,

    /// Identity of the referenced collection.
    pub references: CollectionKey,

    /// ON UPDATE action.
    pub on_update: ReferentialAction,

    /// ON DELETE action.
    pub on_delete: ReferentialAction,
}

/// Incoming edges from one referencing collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferencedBy {
    /// Identity of the referencing (source) collection.
    pub source: CollectionKey,

    /// Back-edges, one per foreign key on the source naming this collection.
    pub foreign_keys: Vec<RefByForeignKey>,
}

impl ReferencedBy {
    /// Find or create the back-edge for a foreign key by name.
    pub fn foreign_key_mut(&mut self, name: &str) -> &mut RefByForeignKey {
        if let Some(pos) = self.foreign_keys.iter().position(|fk| fk.name == name) {
            return &mut self.foreign_keys[pos];
        }
        self.foreign_keys.push(RefByForeignKey {
            name: name.to_string(),
            columns: Vec::new(),
        });
        self.foreign_keys
            .last_mut()
            .unwrap_or_else(|| unreachable!("entry pushed above"))
    }
}

/// The reverse-direction mirror of one foreign key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefByForeignKey {
    /// Name of the mirrored foreign key.
    pub name: String,

    /// Same column pairs, same order, as the outgoing key.
    pub columns: Vec<ForeignKeyColumn>,
}
