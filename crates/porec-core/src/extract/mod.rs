//! Extraction of line items and header metadata from page text.

pub mod header;
pub mod lines;
pub mod patterns;

pub use header::HeaderExtractor;
pub use lines::{parse_amount, LineItemExtractor};
