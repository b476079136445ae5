use once_cell::sync::Lazy;
use regex::Regex;

use super::is_name_line;
use crate::error::OrderError;
use crate::models::{LineItem, PriceCatalog};

/// `Product: 5`, `Product : 5`
static PRODUCT_COLON_QUANTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*:\s*([0-9]+)$").expect("valid regex"));

/// `5 Product`
static QUANTITY_PRODUCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)\s+(.+)$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub product: String,
    pub quantity: u32,
}

/// Parse one trimmed line. Quantities that do not fit `u32` reject the line.
pub fn parse_item_line(line: &str) -> Option<ParsedLine> {
    if let Some(caps) = PRODUCT_COLON_QUANTITY.captures(line) {
        return Some(ParsedLine {
            product: caps[1].trim().to_string(),
            quantity: caps[2].parse().ok()?,
        });
    }

    if let Some(caps) = QUANTITY_PRODUCT.captures(line) {
        return Some(ParsedLine {
            product: caps[2].trim().to_string(),
            quantity: caps[1].parse().ok()?,
        });
    }

    None
}

/// Every recognizable line becomes a priced [`LineItem`]; the rest is ignored.
/// Fails only when a line total does not fit a `Decimal`.
pub fn parse_items(text: &str, catalog: &PriceCatalog) -> Result<Vec<LineItem>, OrderError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_name_line(line))
        .filter_map(|line| {
            let parsed = parse_item_line(line);
            if parsed.is_none() {
                tracing::debug!(line, "Skipping unrecognized order line");
            }
            parsed
        })
        .map(|ParsedLine { product, quantity }| {
            let unit_price = catalog.price_of(&product).unwrap_or_default();
            LineItem::new(product, quantity, unit_price)
        })
        .collect()
}
