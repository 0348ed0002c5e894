//! Metadata provider capability interface.
//!
//! Concrete providers (one per database engine) live outside this crate;
//! the scanner depends only on the [`MetadataProvider`] trait and the row
//! types defined here.

mod metadata;
mod types;

pub use metadata::{MetadataProvider, MetadataStream};
pub use types::{
    CollectionRow, ColumnRow, ConstraintKind, ConstraintRow, IndexColumnRow, IndexRow, TableScope,
};
