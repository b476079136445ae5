//! Heuristic parser for order text pasted from SMS or recovered by OCR.
//!
//! One item per line, either `Product: qty` or `qty Product`. A leading line
//! with no colon and no digit names the customer.

mod customer;
mod items;

pub use customer::{extract_customer_name, UNKNOWN_CUSTOMER};
pub use items::{parse_item_line, parse_items, ParsedLine};

use crate::error::OrderError;
use crate::models::{LineItem, PriceCatalog, PurchaseOrder};

#[derive(Debug, Clone)]
pub struct ParsedOrder {
    pub customer_name: String,
    pub items: Vec<LineItem>,
}

impl ParsedOrder {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_draft(self) -> Result<PurchaseOrder, OrderError> {
        PurchaseOrder::draft(self.customer_name, self.items)
    }
}

/// True for lines that can only be a name: no `:` and no ASCII digit.
pub(crate) fn is_name_line(line: &str) -> bool {
    !line.contains(':') && !line.bytes().any(|b| b.is_ascii_digit())
}

pub fn parse_order_text(text: &str, catalog: &PriceCatalog) -> Result<ParsedOrder, OrderError> {
    Ok(ParsedOrder {
        customer_name: extract_customer_name(text),
        items: parse_items(text, catalog)?,
    })
}
