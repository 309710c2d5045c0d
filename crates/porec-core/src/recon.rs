//! Reconciliation pipeline: page texts in, resolved order out.
//!
//! Pure over its inputs apart from what the storage collaborator does:
//! given the same page texts and the same reference snapshot, the output is
//! identical except for the assigned order number.

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::Result;
use crate::extract::{HeaderExtractor, LineItemExtractor};
use crate::matching::{AliasIndex, BranchResolver, CatalogIndex, ProductMatcher};
use crate::models::config::PorecConfig;
use crate::models::order::{LineItem, OrderHeader, ResolvedOrder, SavedOrder};
use crate::storage::OrderStore;

/// Drives extraction, matching, resolution, and assembly against one
/// storage collaborator.
pub struct Reconciler<'a, S: OrderStore> {
    store: &'a S,
    config: PorecConfig,
}

impl<'a, S: OrderStore> Reconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            config: PorecConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PorecConfig) -> Self {
        self.config = config;
        self
    }

    /// Raw line items from the page texts, not yet matched.
    pub fn extract_line_items(&self, page_texts: &[String]) -> Vec<LineItem> {
        LineItemExtractor::new().extract(page_texts)
    }

    /// Header fields from the document text.
    pub fn extract_header(&self, page_texts: &[String]) -> OrderHeader {
        let full_text = page_texts.join("\n");
        HeaderExtractor::new()
            .with_lookahead(self.config.extraction.header_lookahead_lines)
            .extract(&full_text)
    }

    /// Reconcile one document for the named client. Missing reference data
    /// (unknown client) is an error; unmatched products and unresolved
    /// branches are not, they surface on the returned order.
    pub fn reconcile(&self, page_texts: &[String], client_name: &str) -> Result<ResolvedOrder> {
        let client = self.store.resolve_client_by_name(client_name)?;
        debug!(client_id = client.id, "reconciling order");

        // Immutable reference snapshot for this invocation.
        let catalog = CatalogIndex::build(self.store.load_active_catalog()?);
        let aliases = AliasIndex::build(self.store.load_aliases(client.id)?);
        let branches = self.store.load_branches(client.id)?;

        let header = self.extract_header(page_texts);
        let mut items = self.extract_line_items(page_texts);

        let branch = BranchResolver::new()
            .with_score_threshold(self.config.matching.branch_score_threshold)
            .resolve(
                &branches,
                header.branch_alias.as_deref(),
                header.branch_tax_id.as_deref(),
                header.responsible_name.as_deref(),
            );

        // Warehouse scope follows the client flag; a branch-scoped client
        // with an unresolved branch gets no codes, which forces the order
        // into correction.
        let warehouses = match (client.uses_warehouse_by_branch, branch) {
            (true, Some(b)) => self.store.load_warehouse_map_by_branch(b.id)?,
            (true, None) => Default::default(),
            (false, _) => self.store.load_warehouse_map_by_client(client.id)?,
        };

        let matcher = ProductMatcher::new(&catalog, &aliases);
        for item in &mut items {
            let m = matcher.match_item(&item.unit, &item.description);
            item.match_kind = m.kind;
            item.match_score = m.score;
            if let Some(product) = m.product {
                item.sku = Some(product.sku.clone());
                item.warehouse_code = warehouses.get(&product.id).cloned();
            }
        }

        let branch_name = match branch {
            Some(b) => b.canonical_name.clone(),
            None => ResolvedOrder::branch_error(header.branch_alias.as_deref()),
        };
        let total: Decimal = items.iter().filter_map(|i| i.line_total).sum();
        let lifecycle_state = ResolvedOrder::derive_state(branch.is_some(), &branch_name, &items);

        info!(
            branch = %branch_name,
            items = items.len(),
            state = ?lifecycle_state,
            "order reconciled"
        );

        Ok(ResolvedOrder {
            branch_name,
            client_id: client.id,
            branch_id: branch.map(|b| b.id),
            purchase_order_number: header.purchase_order_number,
            items,
            total,
            lifecycle_state,
        })
    }

    /// Reconcile and persist: assign the next order number, then save.
    pub fn process(
        &self,
        page_texts: &[String],
        client_name: &str,
    ) -> Result<(ResolvedOrder, SavedOrder)> {
        let order = self.reconcile(page_texts, client_name)?;
        let number = self
            .store
            .next_order_number(self.config.matching.order_number_floor)?;
        let saved = self.store.save_order(&order, number)?;
        Ok((order, saved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::CatalogProduct;
    use crate::models::order::{LifecycleState, MatchKind};
    use crate::storage::{
        AliasRecord, BranchRecord, ClientRecord, DataSet, MemoryStore, WarehouseRecord,
    };
    use pretty_assertions::assert_eq;

    fn dataset() -> DataSet {
        DataSet {
            clients: vec![
                ClientRecord {
                    id: 1,
                    name: "Acme Retail".to_string(),
                    uses_warehouse_by_branch: false,
                },
                ClientRecord {
                    id: 2,
                    name: "Branchy Foods".to_string(),
                    uses_warehouse_by_branch: true,
                },
            ],
            products: vec![
                CatalogProduct::new(10, "SKU-010", "Paper Towels"),
                CatalogProduct::new(11, "SKU-011", "Marker Pen"),
            ],
            aliases: vec![AliasRecord {
                client_id: 1,
                product_id: 11,
                alias_text: "esfero".to_string(),
            }],
            branches: vec![
                BranchRecord {
                    client_id: 1,
                    id: 100,
                    canonical_name: "Store A".to_string(),
                    alias: "STORE A".to_string(),
                    tax_id: Some("0101010101".to_string()),
                    responsible_name: Some("Ana Ruiz".to_string()),
                    active: true,
                },
                BranchRecord {
                    client_id: 2,
                    id: 200,
                    canonical_name: "Food Mart".to_string(),
                    alias: "FOOD MART".to_string(),
                    tax_id: None,
                    responsible_name: None,
                    active: true,
                },
            ],
            warehouses_by_client: vec![
                WarehouseRecord {
                    owner_id: 1,
                    product_id: 10,
                    code: "W1".to_string(),
                },
                WarehouseRecord {
                    owner_id: 1,
                    product_id: 11,
                    code: "W1".to_string(),
                },
            ],
            warehouses_by_branch: vec![WarehouseRecord {
                owner_id: 200,
                product_id: 10,
                code: "B-W9".to_string(),
            }],
        }
    }

    fn pages(text: &str) -> Vec<String> {
        vec![text.to_string()]
    }

    const READY_DOC: &str = "\
Solicita: STORE A
RUC: 0101010101
Aprueba: Ana Ruiz 12/03/2025
Box Paper Towels 5 1.00 5.00
Unit Marker Pen 3 10.00 30.00
Subtotal 35.00";

    #[test]
    fn test_end_to_end_ready_order() {
        let store = MemoryStore::new(dataset());
        let order = Reconciler::new(&store)
            .reconcile(&pages(READY_DOC), "Acme Retail")
            .unwrap();

        assert_eq!(order.branch_name, "Store A");
        assert_eq!(order.branch_id, Some(100));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].sku.as_deref(), Some("SKU-010"));
        assert_eq!(order.items[0].warehouse_code.as_deref(), Some("W1"));
        assert_eq!(order.items[0].match_kind, MatchKind::Name);
        assert_eq!(order.total, Decimal::new(3500, 2));
        assert_eq!(order.lifecycle_state, LifecycleState::Ready);
    }

    #[test]
    fn test_alias_matched_item() {
        let store = MemoryStore::new(dataset());
        let doc = "Solicita: STORE A\nUnit Esfero 2 0.30 0.60";
        let order = Reconciler::new(&store)
            .reconcile(&pages(doc), "Acme Retail")
            .unwrap();
        assert_eq!(order.items[0].match_kind, MatchKind::Alias);
        assert_eq!(order.items[0].sku.as_deref(), Some("SKU-011"));
    }

    #[test]
    fn test_unmatched_item_forces_correction() {
        let store = MemoryStore::new(dataset());
        let doc = "Solicita: STORE A\nBox Stapler Heavy 1 4.00 4.00";
        let order = Reconciler::new(&store)
            .reconcile(&pages(doc), "Acme Retail")
            .unwrap();
        assert_eq!(order.items[0].match_kind, MatchKind::Unmatched);
        assert!(order.items[0].sku.is_none());
        assert_eq!(order.lifecycle_state, LifecycleState::NeedsCorrection);
    }

    #[test]
    fn test_unresolved_branch_keeps_alias_in_marker() {
        let store = MemoryStore::new(dataset());
        let doc = "Solicita: NOWHERE SPECIAL\nBox Paper Towels 5 1.00 5.00";
        let order = Reconciler::new(&store)
            .reconcile(&pages(doc), "Acme Retail")
            .unwrap();
        assert_eq!(order.branch_name, "alias not found: NOWHERE SPECIAL");
        assert!(order.branch_id.is_none());
        assert_eq!(order.lifecycle_state, LifecycleState::NeedsCorrection);
        // Client-scoped warehouses still attach despite the branch failure.
        assert_eq!(order.items[0].warehouse_code.as_deref(), Some("W1"));
    }

    #[test]
    fn test_branch_scoped_warehouses() {
        let store = MemoryStore::new(dataset());
        let doc = "Solicita: FOOD MART\nBox Paper Towels 5 1.00 5.00";
        let order = Reconciler::new(&store)
            .reconcile(&pages(doc), "Branchy Foods")
            .unwrap();
        assert_eq!(order.items[0].warehouse_code.as_deref(), Some("B-W9"));
        assert_eq!(order.lifecycle_state, LifecycleState::Ready);
    }

    #[test]
    fn test_branch_scoped_client_without_branch_gets_no_codes() {
        let store = MemoryStore::new(dataset());
        let doc = "Solicita: UNKNOWN\nBox Paper Towels 5 1.00 5.00";
        let order = Reconciler::new(&store)
            .reconcile(&pages(doc), "Branchy Foods")
            .unwrap();
        assert!(order.items[0].warehouse_code.is_none());
        assert_eq!(order.lifecycle_state, LifecycleState::NeedsCorrection);
    }

    #[test]
    fn test_unknown_client_is_hard_error() {
        let store = MemoryStore::new(dataset());
        let result = Reconciler::new(&store).reconcile(&pages(READY_DOC), "Nobody Inc");
        assert!(result.is_err());
    }

    #[test]
    fn test_deterministic_modulo_order_number() {
        let store = MemoryStore::new(dataset());
        let r = Reconciler::new(&store);
        let a = r.reconcile(&pages(READY_DOC), "Acme Retail").unwrap();
        let b = r.reconcile(&pages(READY_DOC), "Acme Retail").unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_process_assigns_numbers_from_floor() {
        let store = MemoryStore::new(dataset());
        let mut config = PorecConfig::default();
        config.matching.order_number_floor = 5000;
        let r = Reconciler::new(&store).with_config(config);

        let (_, first) = r.process(&pages(READY_DOC), "Acme Retail").unwrap();
        let (_, second) = r.process(&pages(READY_DOC), "Acme Retail").unwrap();
        assert_eq!(first.order_number, 5000);
        assert_eq!(second.order_number, 5001);
        assert_eq!(first.lifecycle_state, LifecycleState::Ready);
    }

    #[test]
    fn test_header_po_number_carried_onto_order() {
        let store = MemoryStore::new(dataset());
        let doc = "ORDEN DE COMPRA No. OC-4512\nSolicita: STORE A\nBox Paper Towels 5 1.00 5.00";
        let order = Reconciler::new(&store)
            .reconcile(&pages(doc), "Acme Retail")
            .unwrap();
        assert_eq!(order.purchase_order_number.as_deref(), Some("OC-4512"));
    }
}
