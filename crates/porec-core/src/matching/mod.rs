//! Catalog indexing, product matching, and branch resolution.

pub mod branch;
pub mod index;
pub mod product;

pub use branch::BranchResolver;
pub use index::{AliasIndex, CatalogIndex};
pub use product::{ProductMatch, ProductMatcher};
