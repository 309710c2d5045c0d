//! Shared regex vocabulary for row and header extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Product-table rows. Quantities are 1-4 digits; the two trailing
    // numbers are unit price and row total in either 1.234,56 or 1234.56
    // format.
    pub static ref ROW_WITH_UNIT: Regex = Regex::new(
        r"^(?P<unit>\S+)\s+(?P<desc>.+?)\s+(?P<qty>\d{1,4})\s+(?P<price>\d+(?:[.,]\d+)?)\s+(?P<total>\d+(?:[.,]\d+)?)$"
    ).unwrap();

    pub static ref ROW_BARE: Regex = Regex::new(
        r"^(?P<desc>.+?)\s+(?P<qty>\d{1,4})\s+(?P<price>\d+(?:[.,]\d+)?)\s+(?P<total>\d+(?:[.,]\d+)?)$"
    ).unwrap();

    // Header labels, same-line form: "label: value".
    pub static ref BRANCH_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:Solicita|Sucursal|Branch|Requested\s+by)\s*:\s*(?P<value>.*)$"
    ).unwrap();

    pub static ref RESPONSIBLE_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:Aprueba|Encargado|Responsable|Approved\s+by|Responsible)\s*:\s*(?P<value>.*)$"
    ).unwrap();

    pub static ref TAX_ID_LABEL: Regex = Regex::new(
        r"(?i)\b(?:RUC|Tax\s*ID|NIT)\b"
    ).unwrap();

    pub static ref PO_LABEL: Regex = Regex::new(
        r"(?i)(?:ORDEN\s+DE\s+COMPRA|Purchase\s+Order|P\.\s*O\.|\bPO\b)\s*(?:Number|No\.?|N[°º]|#|:)*\s*(?P<value>[A-Za-z0-9][A-Za-z0-9/\-]*)?"
    ).unwrap();

    // A plausible tax ID is a run of 10-13 digits.
    pub static ref TAX_ID_RUN: Regex = Regex::new(
        r"\b(\d{10,13})\b"
    ).unwrap();

    // Bare purchase-order number on its own line, for the lookahead pass.
    pub static ref PO_BARE: Regex = Regex::new(
        r"^\s*(?:No\.?|N[°º]|#)?\s*(?P<value>[A-Za-z]{0,4}[-/]?\d{3,}[A-Za-z0-9/\-]*)\s*$"
    ).unwrap();

    // Trailing date stamp on a responsible line: "J. Perez 12/03/2024".
    pub static ref TRAILING_DATE: Regex = Regex::new(
        r"\s*\d{1,2}[/.\-]\d{1,2}[/.\-]\d{2,4}\s*$"
    ).unwrap();
}

/// Unit-of-measure vocabulary recognized in the first table column,
/// normalized (lowercase, no trailing period). English and Spanish forms
/// both occur in the wild.
pub const UNIT_WORDS: &[&str] = &[
    "unit", "box", "roll", "package", "bag", "gallon", "kilogram", "ream", "pair",
    "unidad", "caja", "rollo", "paquete", "funda", "galon", "kilo", "resma", "par",
];

/// Markers of boilerplate lines that are never product rows: table headers,
/// totals blocks, supplier/billing data, and approval signatures.
pub const SKIP_MARKERS: &[&str] = &[
    "Uni. Descripción",
    "Unit Description",
    "Subtotal",
    "SUBTOTAL",
    "TOTAL",
    "IVA",
    "VAT",
    "Proveedor",
    "Supplier",
    "ORDEN DE COMPRA",
    "PURCHASE ORDER",
    "Fecha:",
    "Date:",
    "Dirección:",
    "Address:",
    "Teléfono:",
    "Phone:",
    "Política:",
    "Razón",
    "RUC:",
    "Tax ID",
    "E-mail",
    "Datos de facturación",
    "Billing",
    "Aprueba:",
    "Recibe:",
    "Analiza:",
    "Solicita:",
    "Requested by:",
    "Approved by:",
];

/// Strip a trailing period and lowercase: `"Unidad."` and `"Box"` both
/// normalize into vocabulary form.
pub fn clean_unit(token: &str) -> String {
    token.trim().trim_end_matches('.').to_lowercase()
}

/// True when the token (after cleanup) is a recognized unit of measure.
pub fn is_unit_token(token: &str) -> bool {
    UNIT_WORDS.contains(&clean_unit(token).as_str())
}
