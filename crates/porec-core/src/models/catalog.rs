//! Read-only reference data loaded from the storage collaborator.
//!
//! Each reconciliation run obtains its own immutable snapshot of catalog,
//! alias, and branch rows; the engine never mutates shared catalog state.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::normalize::{normalize, token_set};

/// One product of the global active catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: i64,

    /// Canonical product code used by the downstream ERP feed.
    pub sku: String,

    /// Product name as it appears on orders.
    pub name: String,

    /// Derived: normalized name, filled when the index is built.
    #[serde(skip)]
    pub normalized_name: String,

    /// Derived: normalized token set of the name.
    #[serde(skip)]
    pub token_set: HashSet<String>,
}

impl CatalogProduct {
    pub fn new(id: i64, sku: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let normalized_name = normalize(&name);
        let tokens = token_set(&name);
        Self {
            id,
            sku: sku.into(),
            name,
            normalized_name,
            token_set: tokens,
        }
    }

    /// Recompute the derived fields after deserialization.
    pub fn with_derived(mut self) -> Self {
        self.normalized_name = normalize(&self.name);
        self.token_set = token_set(&self.name);
        self
    }
}

/// A client-scoped free-text synonym for one catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAlias {
    /// Weak reference into the catalog.
    pub product_id: i64,

    /// Alias text as entered by an operator.
    pub alias_text: String,

    #[serde(skip)]
    pub normalized_alias: String,
}

impl ProductAlias {
    pub fn new(product_id: i64, alias_text: impl Into<String>) -> Self {
        let alias_text = alias_text.into();
        let normalized_alias = normalize(&alias_text);
        Self {
            product_id,
            alias_text,
            normalized_alias,
        }
    }

    pub fn with_derived(mut self) -> Self {
        self.normalized_alias = normalize(&self.alias_text);
        self
    }
}

/// One branch (physical location) of a client.
///
/// Several branches may share the same display alias (franchise pattern);
/// `tax_id` and `responsible_name` break ties during resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub id: i64,

    /// Canonical system name, the one recorded on resolved orders.
    pub canonical_name: String,

    /// Display alias printed on incoming purchase orders.
    pub alias: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_name: Option<String>,
}

/// Client identity plus the flag selecting the warehouse-map scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRef {
    pub id: i64,

    /// When true, warehouse codes are looked up per branch and the
    /// client-scoped map is not consulted.
    pub uses_warehouse_by_branch: bool,
}
