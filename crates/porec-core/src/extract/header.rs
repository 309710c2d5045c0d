//! Header metadata extraction.
//!
//! Each field is extracted by its own pass over the document lines: a
//! same-line `label: value` pattern first, then a bounded peek over the
//! following lines for a bare value. Fields are independent; a miss on one
//! never blocks another.

use tracing::debug;

use super::patterns::{
    BRANCH_LABEL, PO_BARE, PO_LABEL, RESPONSIBLE_LABEL, TAX_ID_LABEL, TAX_ID_RUN, TRAILING_DATE,
};
use crate::models::order::OrderHeader;

/// Extracts branch alias, tax ID, responsible contact, and purchase-order
/// number from full document text.
pub struct HeaderExtractor {
    /// How many lines past a label to scan for a bare value.
    lookahead: usize,
}

impl HeaderExtractor {
    pub fn new() -> Self {
        Self { lookahead: 2 }
    }

    /// Set the forward-peek bound.
    pub fn with_lookahead(mut self, lines: usize) -> Self {
        self.lookahead = lines;
        self
    }

    /// Run all field passes over the document text.
    pub fn extract(&self, text: &str) -> OrderHeader {
        let lines: Vec<&str> = text.lines().collect();

        let header = OrderHeader {
            branch_alias: self.extract_labeled(&lines, &BRANCH_LABEL),
            branch_tax_id: self.extract_tax_id(&lines, text),
            responsible_name: self
                .extract_labeled(&lines, &RESPONSIBLE_LABEL)
                .map(|v| strip_trailing_date(&v)),
            purchase_order_number: self.extract_po_number(&lines),
        };

        debug!(
            branch = header.branch_alias.as_deref().unwrap_or("-"),
            tax_id = header.branch_tax_id.as_deref().unwrap_or("-"),
            po = header.purchase_order_number.as_deref().unwrap_or("-"),
            "extracted order header"
        );
        header
    }

    /// `label: value` on one line, else the first non-empty line within the
    /// peek bound after the label.
    fn extract_labeled(&self, lines: &[&str], label: &regex::Regex) -> Option<String> {
        for (i, line) in lines.iter().enumerate() {
            let Some(caps) = label.captures(line) else {
                continue;
            };
            let value = caps.name("value").map(|m| m.as_str().trim()).unwrap_or("");
            if !value.is_empty() {
                return Some(value.to_string());
            }
            // Label alone on its line; the value wrapped below it.
            for peek in lines.iter().skip(i + 1).take(self.lookahead) {
                let peek = peek.trim();
                if !peek.is_empty() {
                    return Some(peek.to_string());
                }
            }
        }
        None
    }

    /// Digit run of 10-13 digits on or just after a tax-id label; failing
    /// that, the first plausible run anywhere in the document.
    fn extract_tax_id(&self, lines: &[&str], text: &str) -> Option<String> {
        for (i, line) in lines.iter().enumerate() {
            if !TAX_ID_LABEL.is_match(line) {
                continue;
            }
            let window = lines.iter().skip(i).take(self.lookahead + 1);
            for candidate in window {
                if let Some(m) = TAX_ID_RUN.captures(candidate) {
                    return Some(m[1].to_string());
                }
            }
        }
        TAX_ID_RUN.captures(text).map(|m| m[1].to_string())
    }

    fn extract_po_number(&self, lines: &[&str]) -> Option<String> {
        for (i, line) in lines.iter().enumerate() {
            let Some(caps) = PO_LABEL.captures(line) else {
                continue;
            };
            if let Some(value) = caps.name("value") {
                let value = value.as_str().trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
            for peek in lines.iter().skip(i + 1).take(self.lookahead) {
                if let Some(caps) = PO_BARE.captures(peek.trim()) {
                    if let Some(value) = caps.name("value") {
                        return Some(value.as_str().to_string());
                    }
                }
            }
        }
        None
    }
}

impl Default for HeaderExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop a trailing `DD/MM/YYYY`-style stamp that order templates append to
/// the responsible line.
fn strip_trailing_date(value: &str) -> String {
    TRAILING_DATE.replace(value, "").trim().to_string()
}
