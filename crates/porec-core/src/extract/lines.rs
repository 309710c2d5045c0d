//! Line-item extraction from page text.
//!
//! The product table of an order PDF comes out of text extraction as plain
//! lines. Most rows carry the unit in the first column, but when the
//! description wraps, the unit lands alone on one line and the rest of the
//! row on the next. A single `pending_unit` slot carries that unit across
//! the break. Rows that match neither shape are dropped rather than
//! guessed.

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::patterns::{clean_unit, is_unit_token, ROW_BARE, ROW_WITH_UNIT, SKIP_MARKERS};
use crate::models::order::LineItem;

/// Extracts `{unit, description, quantity}` rows from page text.
pub struct LineItemExtractor;

impl LineItemExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract line items from page texts, in document order. The
    /// continuation state resets per invocation and is carried across page
    /// boundaries within one document.
    pub fn extract(&self, page_texts: &[String]) -> Vec<LineItem> {
        let mut items = Vec::new();
        let mut pending_unit: Option<String> = None;

        for page in page_texts {
            for raw in page.lines() {
                let line = raw.trim();
                if is_skippable(line) {
                    continue;
                }

                // Full row with the unit in the first column.
                if let Some(caps) = ROW_WITH_UNIT.captures(line) {
                    if is_unit_token(&caps["unit"]) {
                        items.push(build_item(clean_unit(&caps["unit"]), &caps));
                        pending_unit = None;
                        continue;
                    }
                }

                // The unit appeared on its own line; the row follows.
                if is_unit_token(line) && !line.contains(' ') {
                    pending_unit = Some(clean_unit(line));
                    continue;
                }

                // Row without a unit column, completed by the stashed unit.
                if let Some(unit) = pending_unit.as_deref() {
                    if let Some(caps) = ROW_BARE.captures(line) {
                        items.push(build_item(unit.to_string(), &caps));
                        pending_unit = None;
                        continue;
                    }
                }

                trace!("dropping unrecognized line: {:?}", line);
            }
        }

        debug!("extracted {} line items", items.len());
        items
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn is_skippable(line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    SKIP_MARKERS.iter().any(|m| line.contains(m))
}

fn build_item(unit: String, caps: &regex::Captures<'_>) -> LineItem {
    let quantity: u32 = caps["qty"].parse().unwrap_or(0);
    let mut item = LineItem::new(unit, caps["desc"].trim(), quantity);
    item.unit_price = parse_amount(&caps["price"]);
    item.line_total = parse_amount(&caps["total"]);
    item
}

/// Parse `1.234,56` (European) or `1234.56` into a Decimal. None when the
/// text is empty or a dash.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let s = text.trim();
    if s.is_empty() || s == "-" {
        return None;
    }
    // Both separators present: dots are thousands, comma is decimal.
    let s = if s.contains(',') && s.contains('.') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.replace(',', ".")
    };
    s.parse().ok()
}
