//! Core library for purchase-order PDF reconciliation.
//!
//! This crate provides:
//! - PDF text extraction (lopdf + pdf-extract)
//! - Line-item and header extraction from order page text
//! - Exact-match product resolution against a catalog and client aliases
//! - Branch resolution with tax-ID and responsible-name disambiguation
//! - Order assembly with a Ready / NeedsCorrection lifecycle

pub mod error;
pub mod extract;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod pdf;
pub mod recon;
pub mod storage;

pub use error::{PdfError, PorecError, Result, StorageError};
pub use extract::{HeaderExtractor, LineItemExtractor};
pub use matching::{AliasIndex, BranchResolver, CatalogIndex, ProductMatcher};
pub use models::config::PorecConfig;
pub use models::order::{
    LifecycleState, LineItem, MatchKind, OrderHeader, ResolvedOrder, SavedOrder,
};
pub use pdf::PdfExtractor;
pub use recon::Reconciler;
pub use storage::{DataSet, MemoryStore, OrderStore};
