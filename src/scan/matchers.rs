//! Sequential matchers for stitching sorted row streams onto the catalog.
//!
//! Both matchers are single forward-moving cursors over a pre-sorted key
//! list. `sequential_find` skips past every entry that precedes the lookup
//! key and returns the exact match, or `None` once the lookup key falls
//! behind the cursor or the list is exhausted. This turns the O(n*m)
//! rescan of matching m rows against n objects into one O(n+m) pass.
//!
//! Precondition: lookups must arrive in non-decreasing key order. An
//! out-of-order lookup yields a false `None` without moving the cursor
//! backwards; call `reset` to rescan from the start.

use std::cmp::Ordering;

/// Key of one base table, in (schema, name) order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TableKey {
    pub schema: String,
    pub name: String,
}

/// Key of one index, in (schema, table, index) order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexKey {
    pub schema: String,
    pub table: String,
    pub index: String,
}

/// Forward-only cursor over the catalog's base tables.
#[derive(Debug)]
pub struct SortedTables {
    keys: Vec<TableKey>,
    cursor: usize,
}

impl SortedTables {
    /// Build from keys already sorted by (schema, name).
    pub fn new(keys: Vec<TableKey>) -> Self {
        debug_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        Self { keys, cursor: 0 }
    }

    /// Advance past every table preceding (schema, name) and return the
    /// exact match, if the cursor reaches one.
    pub fn sequential_find(&mut self, schema: &str, name: &str) -> Option<&TableKey> {
        while let Some(key) = self.keys.get(self.cursor) {
            match (key.schema.as_str(), key.name.as_str()).cmp(&(schema, name)) {
                Ordering::Less => self.cursor += 1,
                Ordering::Equal => return Some(&self.keys[self.cursor]),
                Ordering::Greater => return None,
            }
        }
        None
    }

    /// Rewind the cursor to the start of the list.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// Forward-only cursor over a sorted index list.
#[derive(Debug)]
pub struct SortedIndexes {
    keys: Vec<IndexKey>,
    cursor: usize,
}

impl SortedIndexes {
    /// Build from keys already sorted by (schema, table, index).
    pub fn new(keys: Vec<IndexKey>) -> Self {
        debug_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        Self { keys, cursor: 0 }
    }

    /// Advance past every index preceding (schema, table, index) and
    /// return the exact match, if the cursor reaches one.
    pub fn sequential_find(&mut self, schema: &str, table: &str, index: &str) -> Option<&IndexKey> {
        while let Some(key) = self.keys.get(self.cursor) {
            let cmp = (key.schema.as_str(), key.table.as_str(), key.index.as_str())
                .cmp(&(schema, table, index));
            match cmp {
                Ordering::Less => self.cursor += 1,
                Ordering::Equal => return Some(&self.keys[self.cursor]),
                Ordering::Greater => return None,
            }
        }
        None
    }

    /// Rewind the cursor to the start of the list.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}
