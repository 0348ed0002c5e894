use serde::{Deserialize, Serialize};

/// Physical index structure reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    BTree,
    Hash,
    /// Anything else, carried verbatim.
    Other(String),
}

impl IndexType {
    /// Parse an engine-reported type tag; unknown tags are preserved.
    pub fn parse(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "btree" | "b-tree" | "" => Self::BTree,
            "hash" => Self::Hash,
            _ => Self::Other(tag.to_string()),
        }
    }
}

/// An index on a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Structure tag.
    pub index_type: IndexType,

    /// Whether the index enforces uniqueness.
    pub unique: bool,

    /// Whether the index backs the primary key.
    pub primary: bool,

    /// Member columns in index order.
    pub columns: Vec<IndexColumn>,
}

/// One column of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexColumn {
    /// Column name.
    pub name: String,

    /// Whether the column is indexed in descending order.
    pub descending: bool,
}
