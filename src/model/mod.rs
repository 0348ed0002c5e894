//! The catalog object graph.
//!
//! A scan produces one [`Catalog`]: an ordered set of schemas, each owning
//! its tables and views. Foreign keys and their reverse `ReferencedBy`
//! edges reference collections by identity ([`CollectionKey`]), not by
//! pointer, so the graph serializes losslessly and stays `Send`.
//!
//! The graph is built by one `scan_catalog` call and never mutated after
//! the call returns.

mod catalog;
mod collection;
mod index;

pub use catalog::{Catalog, Schema};
pub use collection::{
    Collection, CollectionKey, Column, DbObjectType, ForeignKey, ForeignKeyColumn,
    RefByForeignKey, ReferencedBy, ReferentialAction, UniqueKey,
};
pub use index::{Index, IndexColumn, IndexType};
