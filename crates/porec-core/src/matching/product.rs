//! Product matching: free-text description to catalog entry.
//!
//! Matching is exact-only by design. A false positive silently misroutes a
//! warehouse dispatch, so ambiguity surfaces as `Unmatched` for human
//! review instead of a similarity guess.

use tracing::trace;

use super::index::{AliasIndex, CatalogIndex};
use crate::models::catalog::CatalogProduct;
use crate::models::order::MatchKind;

/// Outcome of matching one line item.
pub struct ProductMatch<'a> {
    pub product: Option<&'a CatalogProduct>,
    pub kind: MatchKind,
    pub score: f32,
}

impl<'a> ProductMatch<'a> {
    fn hit(product: &'a CatalogProduct, kind: MatchKind) -> Self {
        Self {
            product: Some(product),
            kind,
            score: 1.0,
        }
    }

    fn miss() -> Self {
        Self {
            product: None,
            kind: MatchKind::Unmatched,
            score: 0.0,
        }
    }
}

/// Resolves line-item descriptions against one catalog/alias snapshot.
pub struct ProductMatcher<'a> {
    catalog: &'a CatalogIndex,
    aliases: &'a AliasIndex,
}

impl<'a> ProductMatcher<'a> {
    pub fn new(catalog: &'a CatalogIndex, aliases: &'a AliasIndex) -> Self {
        Self { catalog, aliases }
    }

    /// Strategy chain, first hit wins:
    /// 1. description vs catalog name/SKU,
    /// 2. description vs client alias,
    /// 3. both again with the `"unit description"` composite,
    /// 4. unmatched.
    pub fn match_item(&self, unit: &str, description: &str) -> ProductMatch<'a> {
        if let Some(p) = self.catalog.find_by_exact_name_or_sku(description) {
            return ProductMatch::hit(p, MatchKind::Name);
        }
        if let Some(p) = self.aliases.find_by_exact_alias(self.catalog, description) {
            return ProductMatch::hit(p, MatchKind::Alias);
        }

        // Some catalogs fold the unit into the product name ("BOX PAPER
        // TOWELS"); retry with the composite before giving up.
        if !unit.trim().is_empty() && !description.trim().is_empty() {
            let combined = format!("{} {}", unit, description);
            if let Some(p) = self.catalog.find_by_exact_name_or_sku(&combined) {
                return ProductMatch::hit(p, MatchKind::NameCombined);
            }
            if let Some(p) = self.aliases.find_by_exact_alias(self.catalog, &combined) {
                return ProductMatch::hit(p, MatchKind::AliasCombined);
            }
        }

        trace!(description, "no exact product match");
        ProductMatch::miss()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::ProductAlias;

    fn fixtures() -> (CatalogIndex, AliasIndex) {
        let catalog = CatalogIndex::build(vec![
            CatalogProduct::new(1, "SKU-001", "Paper Towels"),
            CatalogProduct::new(2, "SKU-002", "Box Napkins White"),
        ]);
        let aliases = AliasIndex::build(vec![
            ProductAlias::new(1, "toallas"),
            ProductAlias::new(2, "bag servilletas blancas"),
        ]);
        (catalog, aliases)
    }

    #[test]
    fn test_exact_name_match() {
        let (c, a) = fixtures();
        let m = ProductMatcher::new(&c, &a).match_item("box", "PAPER TOWELS");
        assert_eq!(m.kind, MatchKind::Name);
        assert_eq!(m.score, 1.0);
        assert_eq!(m.product.unwrap().sku, "SKU-001");
    }

    #[test]
    fn test_exact_sku_match_counts_as_name() {
        let (c, a) = fixtures();
        let m = ProductMatcher::new(&c, &a).match_item("unit", "sku-001");
        assert_eq!(m.kind, MatchKind::Name);
    }

    #[test]
    fn test_alias_match() {
        let (c, a) = fixtures();
        let m = ProductMatcher::new(&c, &a).match_item("box", "Toallas");
        assert_eq!(m.kind, MatchKind::Alias);
        assert_eq!(m.score, 1.0);
    }

    #[test]
    fn test_combined_name_match() {
        let (c, a) = fixtures();
        // "Napkins White" alone misses; "box napkins white" hits the name.
        let m = ProductMatcher::new(&c, &a).match_item("Box", "Napkins White");
        assert_eq!(m.kind, MatchKind::NameCombined);
        assert_eq!(m.product.unwrap().id, 2);
    }

    #[test]
    fn test_combined_alias_match() {
        let (c, a) = fixtures();
        let m = ProductMatcher::new(&c, &a).match_item("bag", "Servilletas Blancas");
        assert_eq!(m.kind, MatchKind::AliasCombined);
    }

    #[test]
    fn test_unmatched() {
        let (c, a) = fixtures();
        let m = ProductMatcher::new(&c, &a).match_item("box", "stapler heavy duty");
        assert_eq!(m.kind, MatchKind::Unmatched);
        assert!(m.product.is_none());
        assert_eq!(m.score, 0.0);
    }

    #[test]
    fn test_scores_are_exact_or_zero() {
        let (c, a) = fixtures();
        let matcher = ProductMatcher::new(&c, &a);
        for desc in ["Paper Towels", "toallas", "paper towel", "unknown"] {
            let m = matcher.match_item("box", desc);
            assert!(m.score == 1.0 || m.score == 0.0);
            assert_eq!(m.score == 1.0, m.product.is_some());
        }
    }

    #[test]
    fn test_empty_unit_skips_combined_retry() {
        let (c, a) = fixtures();
        let m = ProductMatcher::new(&c, &a).match_item("", "Napkins White");
        assert_eq!(m.kind, MatchKind::Unmatched);
    }
}
