//! # Schemer
//!
//! Schema-scanning engine: introspects a live database through a pluggable
//! metadata provider and assembles a mutually consistent catalog graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            MetadataProvider (per engine)                 │
//! │  collections / columns / indexes / constraints streams   │
//! │        per-object mode  ──or──  bulk mode                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [concurrent fetch phase]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Task runner (fan-out/join, aggregate every error)      │
//! └─────────────────────────────────────────────────────────┘
//!                          │ join barrier
//!                          ▼ [sequential stitch phase]
//! ┌─────────────────────────────────────────────────────────┐
//! │  Sequential matchers + constraint processor              │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  Catalog graph (schemas ▸ tables ▸ columns/keys/indexes, │
//! │  foreign keys paired with ReferencedBy back-edges)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The graph is read-only once a scan returns; persistence and report
//! rendering are downstream consumers, not part of this crate.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod scan;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::ScanOptions;
    pub use crate::error::{ProviderError, ProviderResult, ScanError, ScanFailure, TaskErrors};
    pub use crate::model::{
        Catalog, Collection, CollectionKey, Column, DbObjectType, ForeignKey, Index, Schema,
        UniqueKey,
    };
    pub use crate::provider::{MetadataProvider, MetadataStream, TableScope};
    pub use crate::scan::{ScanOutcome, ScanWarning, Schemer};
}

pub use config::ScanOptions;
pub use error::{ProviderError, ScanError, ScanFailure};
pub use provider::MetadataProvider;
pub use scan::{ScanOutcome, Schemer};
