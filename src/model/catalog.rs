use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::collection::{Collection, CollectionKey};

/// The root of the scanned graph: one database catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog name.
    pub name: String,

    /// Schemas keyed by name; the map keeps them ordered.
    pub schemas: BTreeMap<String, Schema>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: BTreeMap::new(),
        }
    }

    /// Look up a schema by name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Get or create a schema by name.
    pub fn schema_entry(&mut self, name: &str) -> &mut Schema {
        self.schemas
            .entry(name.to_string())
            .or_insert_with(|| Schema::new(name))
    }

    /// Look up a base table by (schema, name).
    ///
    /// Valid once classification has completed (tables are sorted then).
    pub fn table(&self, schema: &str, name: &str) -> Option<&Collection> {
        self.schemas.get(schema).and_then(|s| s.table(name))
    }

    /// Mutable table lookup by (schema, name).
    pub fn table_mut(&mut self, schema: &str, name: &str) -> Option<&mut Collection> {
        self.schemas.get_mut(schema).and_then(|s| s.table_mut(name))
    }

    /// Resolve a collection identity against this catalog.
    pub fn resolve(&self, key: &CollectionKey) -> Option<&Collection> {
        if key.catalog != self.name {
            return None;
        }
        self.table(&key.schema, &key.name)
    }

    /// Sort every schema's tables and views by name.
    ///
    /// Called once at the end of classification; table lookups binary
    /// search and the sequential matchers assume this order.
    pub fn sort_collections(&mut self) {
        for schema in self.schemas.values_mut() {
            schema.tables.sort_by(|a, b| a.name.cmp(&b.name));
            schema.views.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// All base tables in (schema, name) order.
    pub fn tables(&self) -> impl Iterator<Item = &Collection> {
        self.schemas.values().flat_map(|s| s.tables.iter())
    }

    /// Identities of all base tables in (schema, name) order.
    pub fn table_keys(&self) -> Vec<CollectionKey> {
        self.tables().map(|t| t.key(&self.name)).collect()
    }
}

/// One schema: disjoint lists of base tables and views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name; doubles as its unique ID within the catalog.
    pub name: String,

    /// Base tables, sorted by name after classification.
    pub tables: Vec<Collection>,

    /// Views, sorted by name after classification.
    pub views: Vec<Collection>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            views: Vec::new(),
        }
    }

    /// Look up a base table by name (binary search over the sorted list).
    pub fn table(&self, name: &str) -> Option<&Collection> {
        self.tables
            .binary_search_by(|t| t.name.as_str().cmp(name))
            .ok()
            .map(|pos| &self.tables[pos])
    }

    /// Mutable base-table lookup by name.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Collection> {
        self.tables
            .binary_search_by(|t| t.name.as_str().cmp(name))
            .ok()
            .map(move |pos| &mut self.tables[pos])
    }

    /// Look up a view by name.
    pub fn view(&self, name: &str) -> Option<&Collection> {
        self.views
            .binary_search_by(|v| v.name.as_str().cmp(name))
            .ok()
            .map(|pos| &self.views[pos])
    }
}
