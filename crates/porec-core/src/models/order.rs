//! Order data models: extracted line items, header fields, and the
//! reconciled order handed to the storage collaborator.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Marker prefix for a branch alias that could not be resolved.
///
/// The order keeps the offending alias text so a reviewer can correct it;
/// it is never silently replaced by a placeholder branch.
pub const BRANCH_NOT_FOUND_PREFIX: &str = "alias not found:";

/// One row of the purchase-order table, as extracted from the PDF and later
/// enriched by the product matcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Unit of measure as printed (box, roll, unit, ...).
    pub unit: String,

    /// Free-text product description as printed.
    pub description: String,

    /// Ordered quantity.
    pub quantity: u32,

    /// Unit price as printed, if the row carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Decimal>,

    /// Row total as printed, if the row carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<Decimal>,

    /// Resolved catalog SKU. None iff `match_kind` is `Unmatched`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Dispatch warehouse code for the matched product.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_code: Option<String>,

    /// How the description was matched against the catalog.
    pub match_kind: MatchKind,

    /// Match score: 1.0 for any exact match, 0.0 otherwise. The matcher
    /// never produces intermediate scores.
    pub match_score: f32,
}

impl LineItem {
    /// A freshly extracted, not-yet-matched row.
    pub fn new(unit: impl Into<String>, description: impl Into<String>, quantity: u32) -> Self {
        Self {
            unit: unit.into(),
            description: description.into(),
            quantity,
            unit_price: None,
            line_total: None,
            sku: None,
            warehouse_code: None,
            match_kind: MatchKind::Unmatched,
            match_score: 0.0,
        }
    }

    /// True when the row resolved to a SKU and a dispatch warehouse.
    pub fn is_complete(&self) -> bool {
        self.sku.is_some() && self.warehouse_code.is_some()
    }
}

/// How a line item's description resolved against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Exact normalized match against a catalog name or SKU.
    Name,
    /// Exact normalized match against a client alias.
    Alias,
    /// Name/SKU match against the `"unit description"` composite.
    NameCombined,
    /// Alias match against the `"unit description"` composite.
    AliasCombined,
    /// No exact match found; requires human review.
    Unmatched,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Name => "name",
            MatchKind::Alias => "alias",
            MatchKind::NameCombined => "name_combined",
            MatchKind::AliasCombined => "alias_combined",
            MatchKind::Unmatched => "unmatched",
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchKind::Unmatched)
    }
}

/// Header metadata extracted from the document. Every field is optional and
/// extracted independently; a miss on one never blocks another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHeader {
    /// Branch alias as printed on the order (the `Solicita:` line).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_alias: Option<String>,

    /// Tax ID (10-13 digit run) found near the tax-id label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_tax_id: Option<String>,

    /// Responsible contact, with any trailing date stamp stripped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible_name: Option<String>,

    /// Purchase-order number as printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order_number: Option<String>,
}

/// Whether a reconciled order can be exported or needs human correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Branch unresolved or at least one row missing SKU/warehouse.
    NeedsCorrection,
    /// Branch resolved and every row complete.
    Ready,
}

/// A reconciled order, ready to be handed to the storage collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedOrder {
    /// Canonical branch name, or the `alias not found: ...` marker.
    pub branch_name: String,

    /// Client the order belongs to.
    pub client_id: i64,

    /// Resolved branch id, when resolution succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,

    /// Purchase-order number from the header, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_order_number: Option<String>,

    /// Line items in document order.
    pub items: Vec<LineItem>,

    /// Sum of the row totals that were present on the PDF.
    pub total: Decimal,

    /// Derived from branch resolution and item completeness; never set
    /// directly by a caller.
    pub lifecycle_state: LifecycleState,
}

impl ResolvedOrder {
    /// Marker string recorded when the branch alias did not resolve.
    pub fn branch_error(alias: Option<&str>) -> String {
        format!("{} {}", BRANCH_NOT_FOUND_PREFIX, alias.unwrap_or("(missing)"))
    }

    /// True when `branch_name` carries the unresolved-alias marker.
    pub fn has_branch_error(&self) -> bool {
        self.branch_name.starts_with(BRANCH_NOT_FOUND_PREFIX)
    }

    /// Derive the lifecycle state from branch resolution and row
    /// completeness. `NeedsCorrection` wins whenever anything is missing.
    pub fn derive_state(branch_resolved: bool, branch_name: &str, items: &[LineItem]) -> LifecycleState {
        let branch_bad = !branch_resolved || branch_name.starts_with(BRANCH_NOT_FOUND_PREFIX);
        let items_bad = items.iter().any(|i| !i.is_complete());
        if branch_bad || items_bad {
            LifecycleState::NeedsCorrection
        } else {
            LifecycleState::Ready
        }
    }

    /// Row indexes that still need review, for the correction UI.
    pub fn incomplete_items(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.is_complete())
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Identifiers returned by the storage collaborator after persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedOrder {
    pub order_id: i64,
    pub order_number: u64,
    pub lifecycle_state: LifecycleState,
}
