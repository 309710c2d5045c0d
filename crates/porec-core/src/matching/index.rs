//! In-memory lookup structures over one catalog/alias snapshot.
//!
//! Built once per reconciliation run from rows supplied by the storage
//! collaborator. Lookups are exact (O(1) on normalized strings); the retry
//! policy that makes matching forgiving lives in the product matcher, not
//! here.

use std::collections::HashMap;

use tracing::debug;

use crate::models::catalog::{CatalogProduct, ProductAlias};
use crate::normalize::normalize;

/// Global product catalog indexed by normalized name and normalized SKU.
pub struct CatalogIndex {
    products: Vec<CatalogProduct>,
    by_name: HashMap<String, usize>,
    by_sku: HashMap<String, usize>,
    by_id: HashMap<i64, usize>,
}

impl CatalogIndex {
    /// Build the index. On duplicate normalized names or SKUs the first
    /// entry wins.
    pub fn build(products: Vec<CatalogProduct>) -> Self {
        let products: Vec<CatalogProduct> =
            products.into_iter().map(|p| p.with_derived()).collect();

        let mut by_name = HashMap::with_capacity(products.len());
        let mut by_sku = HashMap::with_capacity(products.len());
        let mut by_id = HashMap::with_capacity(products.len());

        for (i, p) in products.iter().enumerate() {
            if !p.normalized_name.is_empty() {
                by_name.entry(p.normalized_name.clone()).or_insert(i);
            }
            let sku_norm = normalize(&p.sku);
            if !sku_norm.is_empty() {
                by_sku.entry(sku_norm).or_insert(i);
            }
            by_id.entry(p.id).or_insert(i);
        }

        debug!("catalog index built over {} products", products.len());
        Self {
            products,
            by_name,
            by_sku,
            by_id,
        }
    }

    /// Exact lookup of normalized text against product name or SKU.
    pub fn find_by_exact_name_or_sku(&self, text: &str) -> Option<&CatalogProduct> {
        let key = normalize(text);
        if key.is_empty() {
            return None;
        }
        self.by_name
            .get(&key)
            .or_else(|| self.by_sku.get(&key))
            .map(|&i| &self.products[i])
    }

    pub fn get(&self, product_id: i64) -> Option<&CatalogProduct> {
        self.by_id.get(&product_id).map(|&i| &self.products[i])
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Per-client alias table indexed by normalized alias text.
pub struct AliasIndex {
    by_alias: HashMap<String, i64>,
}

impl AliasIndex {
    /// Build the index. Several aliases may name the same product; when two
    /// alias rows normalize to the same key, the first one (load order)
    /// wins.
    pub fn build(aliases: Vec<ProductAlias>) -> Self {
        let mut by_alias = HashMap::with_capacity(aliases.len());
        for alias in aliases.into_iter().map(|a| a.with_derived()) {
            if alias.normalized_alias.is_empty() {
                continue;
            }
            by_alias
                .entry(alias.normalized_alias)
                .or_insert(alias.product_id);
        }
        Self { by_alias }
    }

    /// Exact lookup of normalized text against the alias table, resolved to
    /// a catalog product.
    pub fn find_by_exact_alias<'a>(
        &self,
        catalog: &'a CatalogIndex,
        text: &str,
    ) -> Option<&'a CatalogProduct> {
        let key = normalize(text);
        if key.is_empty() {
            return None;
        }
        self.by_alias.get(&key).and_then(|&id| catalog.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_alias.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_alias.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogIndex {
        CatalogIndex::build(vec![
            CatalogProduct::new(1, "SKU-001", "Paper Towels"),
            CatalogProduct::new(2, "SKU-002", "Marker Pen Blue"),
        ])
    }

    #[test]
    fn test_find_by_name_normalized() {
        let idx = catalog();
        let p = idx.find_by_exact_name_or_sku("  PAPER   towels ").unwrap();
        assert_eq!(p.id, 1);
    }

    #[test]
    fn test_find_by_sku() {
        let idx = catalog();
        let p = idx.find_by_exact_name_or_sku("sku-002").unwrap();
        assert_eq!(p.id, 2);
    }

    #[test]
    fn test_find_miss() {
        let idx = catalog();
        assert!(idx.find_by_exact_name_or_sku("stapler").is_none());
        assert!(idx.find_by_exact_name_or_sku("").is_none());
    }

    #[test]
    fn test_alias_lookup() {
        let idx = catalog();
        let aliases = AliasIndex::build(vec![
            ProductAlias::new(1, "Toallas"),
            ProductAlias::new(2, "esfero"),
        ]);
        let p = idx
            .find_by_exact_name_or_sku("does not exist")
            .or_else(|| aliases.find_by_exact_alias(&idx, "TOALLAS"))
            .unwrap();
        assert_eq!(p.id, 1);
    }

    #[test]
    fn test_alias_first_occurrence_wins() {
        let idx = catalog();
        let aliases = AliasIndex::build(vec![
            ProductAlias::new(1, "generic"),
            ProductAlias::new(2, "Generic"),
        ]);
        let p = aliases.find_by_exact_alias(&idx, "generic").unwrap();
        assert_eq!(p.id, 1);
    }
}
