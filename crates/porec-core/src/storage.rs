//! Storage collaborator interface and the in-memory reference
//! implementation.
//!
//! The engine consumes reference data and persists orders exclusively
//! through [`OrderStore`]; the relational backend lives outside this crate.
//! [`MemoryStore`] implements the trait over a serde-loadable dataset and
//! backs the test suite and the CLI.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::StorageError;
use crate::models::catalog::{Branch, CatalogProduct, ClientRef, ProductAlias};
use crate::models::order::{ResolvedOrder, SavedOrder};

/// Reference-data and persistence operations the engine depends on.
///
/// Every reconciliation invocation must see an immutable snapshot of the
/// load results. `next_order_number` is the single write side effect and
/// MUST be atomic in the implementation (transactional read-modify-write or
/// a database sequence); the engine itself does not serialize concurrent
/// invocations.
pub trait OrderStore {
    /// Full active product catalog (global, not client-scoped).
    fn load_active_catalog(&self) -> Result<Vec<CatalogProduct>, StorageError>;

    /// Alias table of one client, in stable load order.
    fn load_aliases(&self, client_id: i64) -> Result<Vec<ProductAlias>, StorageError>;

    /// product_id -> warehouse code, client scope.
    fn load_warehouse_map_by_client(
        &self,
        client_id: i64,
    ) -> Result<HashMap<i64, String>, StorageError>;

    /// product_id -> warehouse code, branch scope.
    fn load_warehouse_map_by_branch(
        &self,
        branch_id: i64,
    ) -> Result<HashMap<i64, String>, StorageError>;

    /// Active branches of one client.
    fn load_branches(&self, client_id: i64) -> Result<Vec<Branch>, StorageError>;

    /// Client id plus the warehouse-scope flag; missing client is a hard
    /// error.
    fn resolve_client_by_name(&self, name: &str) -> Result<ClientRef, StorageError>;

    /// Next order number: `max(floor, last_assigned + 1)`. Monotonic and
    /// gap-tolerant; numbers are never reused even after deletions.
    fn next_order_number(&self, floor: u64) -> Result<u64, StorageError>;

    /// Persist a reconciled order under an already-assigned number and
    /// return its identifiers.
    fn save_order(&self, order: &ResolvedOrder, order_number: u64)
        -> Result<SavedOrder, StorageError>;
}

/// One client row of the dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub uses_warehouse_by_branch: bool,
}

/// Warehouse assignment row of the dataset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarehouseRecord {
    /// Owning client id or branch id, depending on the map.
    pub owner_id: i64,
    pub product_id: i64,
    pub code: String,
}

/// Alias row with its owning client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasRecord {
    pub client_id: i64,
    pub product_id: i64,
    pub alias_text: String,
}

/// Branch row with its owning client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchRecord {
    pub client_id: i64,
    pub id: i64,
    pub canonical_name: String,
    pub alias: String,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub responsible_name: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Serializable reference dataset backing [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSet {
    pub clients: Vec<ClientRecord>,
    pub products: Vec<CatalogProduct>,
    pub aliases: Vec<AliasRecord>,
    pub branches: Vec<BranchRecord>,
    pub warehouses_by_client: Vec<WarehouseRecord>,
    pub warehouses_by_branch: Vec<WarehouseRecord>,
}

impl DataSet {
    /// Load a dataset from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }
}

/// In-memory [`OrderStore`]: reference data from a [`DataSet`], orders and
/// the number counter behind a mutex so `next_order_number` stays atomic
/// under concurrent reconciliations.
pub struct MemoryStore {
    data: DataSet,
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    last_number: u64,
    orders: Vec<ResolvedOrder>,
}

impl MemoryStore {
    pub fn new(data: DataSet) -> Self {
        Self {
            data,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Number of persisted orders, for reporting.
    pub fn order_count(&self) -> usize {
        self.state.lock().map(|s| s.orders.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, StoreState>, StorageError> {
        self.state
            .lock()
            .map_err(|_| StorageError::Backend("store mutex poisoned".to_string()))
    }
}

impl OrderStore for MemoryStore {
    fn load_active_catalog(&self) -> Result<Vec<CatalogProduct>, StorageError> {
        Ok(self.data.products.clone())
    }

    fn load_aliases(&self, client_id: i64) -> Result<Vec<ProductAlias>, StorageError> {
        Ok(self
            .data
            .aliases
            .iter()
            .filter(|a| a.client_id == client_id)
            .map(|a| ProductAlias::new(a.product_id, a.alias_text.clone()))
            .collect())
    }

    fn load_warehouse_map_by_client(
        &self,
        client_id: i64,
    ) -> Result<HashMap<i64, String>, StorageError> {
        Ok(self
            .data
            .warehouses_by_client
            .iter()
            .filter(|w| w.owner_id == client_id)
            .map(|w| (w.product_id, w.code.clone()))
            .collect())
    }

    fn load_warehouse_map_by_branch(
        &self,
        branch_id: i64,
    ) -> Result<HashMap<i64, String>, StorageError> {
        Ok(self
            .data
            .warehouses_by_branch
            .iter()
            .filter(|w| w.owner_id == branch_id)
            .map(|w| (w.product_id, w.code.clone()))
            .collect())
    }

    fn load_branches(&self, client_id: i64) -> Result<Vec<Branch>, StorageError> {
        Ok(self
            .data
            .branches
            .iter()
            .filter(|b| b.client_id == client_id && b.active)
            .map(|b| Branch {
                id: b.id,
                canonical_name: b.canonical_name.clone(),
                alias: b.alias.clone(),
                tax_id: b.tax_id.clone(),
                responsible_name: b.responsible_name.clone(),
            })
            .collect())
    }

    fn resolve_client_by_name(&self, name: &str) -> Result<ClientRef, StorageError> {
        self.data
            .clients
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| ClientRef {
                id: c.id,
                uses_warehouse_by_branch: c.uses_warehouse_by_branch,
            })
            .ok_or_else(|| StorageError::ClientNotFound(name.to_string()))
    }

    fn next_order_number(&self, floor: u64) -> Result<u64, StorageError> {
        let mut state = self.lock()?;
        let number = floor.max(state.last_number + 1);
        state.last_number = number;
        Ok(number)
    }

    fn save_order(
        &self,
        order: &ResolvedOrder,
        order_number: u64,
    ) -> Result<SavedOrder, StorageError> {
        let mut state = self.lock()?;
        state.orders.push(order.clone());
        let saved = SavedOrder {
            order_id: state.orders.len() as i64,
            order_number,
            lifecycle_state: order.lifecycle_state,
        };
        info!(
            order_number = saved.order_number,
            state = ?saved.lifecycle_state,
            items = order.items.len(),
            "order persisted"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{LifecycleState, LineItem};
    use rust_decimal::Decimal;

    fn dataset() -> DataSet {
        DataSet {
            clients: vec![ClientRecord {
                id: 1,
                name: "Acme Retail".to_string(),
                uses_warehouse_by_branch: false,
            }],
            products: vec![CatalogProduct::new(10, "SKU-010", "Paper Towels")],
            aliases: vec![AliasRecord {
                client_id: 1,
                product_id: 10,
                alias_text: "toallas".to_string(),
            }],
            branches: vec![
                BranchRecord {
                    client_id: 1,
                    id: 100,
                    canonical_name: "Store A".to_string(),
                    alias: "STORE A".to_string(),
                    tax_id: Some("0101".to_string()),
                    responsible_name: None,
                    active: true,
                },
                BranchRecord {
                    client_id: 1,
                    id: 101,
                    canonical_name: "Closed Store".to_string(),
                    alias: "OLD".to_string(),
                    tax_id: None,
                    responsible_name: None,
                    active: false,
                },
            ],
            warehouses_by_client: vec![WarehouseRecord {
                owner_id: 1,
                product_id: 10,
                code: "W1".to_string(),
            }],
            warehouses_by_branch: vec![],
        }
    }

    #[test]
    fn test_resolve_client_case_insensitive() {
        let store = MemoryStore::new(dataset());
        let c = store.resolve_client_by_name("ACME retail").unwrap();
        assert_eq!(c.id, 1);
        assert!(!c.uses_warehouse_by_branch);
    }

    #[test]
    fn test_missing_client_is_hard_error() {
        let store = MemoryStore::new(dataset());
        assert!(matches!(
            store.resolve_client_by_name("Nobody"),
            Err(StorageError::ClientNotFound(_))
        ));
    }

    #[test]
    fn test_inactive_branches_excluded() {
        let store = MemoryStore::new(dataset());
        let branches = store.load_branches(1).unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].id, 100);
    }

    #[test]
    fn test_next_order_number_floor_and_monotonic() {
        let store = MemoryStore::new(dataset());
        assert_eq!(store.next_order_number(1000).unwrap(), 1000);
        assert_eq!(store.next_order_number(1000).unwrap(), 1001);
        // Floor below the counter does not wind it back.
        assert_eq!(store.next_order_number(1).unwrap(), 1002);
    }

    #[test]
    fn test_save_order_records_assigned_number() {
        let store = MemoryStore::new(dataset());
        let order = ResolvedOrder {
            branch_name: "Store A".to_string(),
            client_id: 1,
            branch_id: Some(100),
            purchase_order_number: None,
            items: vec![LineItem::new("box", "x", 1)],
            total: Decimal::ZERO,
            lifecycle_state: LifecycleState::NeedsCorrection,
        };
        let n1 = store.next_order_number(1).unwrap();
        let a = store.save_order(&order, n1).unwrap();
        let n2 = store.next_order_number(1).unwrap();
        let b = store.save_order(&order, n2).unwrap();
        assert_eq!(a.order_number, 1);
        assert_eq!(b.order_number, 2);
        assert_eq!(store.order_count(), 2);
    }
}
