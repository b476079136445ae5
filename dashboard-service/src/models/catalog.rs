use rust_decimal::Decimal;
use std::collections::HashMap;

/// Built-in unit prices, keyed by lowercase product name.
const DEFAULT_PRICES: &[(&str, i64)] = &[
    ("royal stage 1l", 2599),
    ("old monk 500ml", 1599),
    ("royal stage", 2599),
    ("old monk", 1599),
    ("bacardi 750ml", 1999),
    ("mcdowell 1l", 2299),
    ("teachers 750ml", 2899),
    ("blenders pride 750ml", 2499),
];

/// Exact-match product price table used when pricing parsed order lines.
#[derive(Debug, Clone)]
pub struct PriceCatalog {
    prices: HashMap<String, Decimal>,
}

impl Default for PriceCatalog {
    fn default() -> Self {
        Self {
            prices: DEFAULT_PRICES
                .iter()
                .map(|(name, cents)| (name.to_string(), Decimal::new(*cents, 2)))
                .collect(),
        }
    }
}

impl PriceCatalog {
    /// Built-in table with `overrides` layered on top.
    pub fn with_overrides<I, K>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, Decimal)>,
        K: AsRef<str>,
    {
        let mut catalog = Self::default();
        for (name, price) in overrides {
            catalog.insert(name.as_ref(), price);
        }
        catalog
    }

    pub fn insert(&mut self, name: &str, price: Decimal) {
        self.prices.insert(name.trim().to_lowercase(), price);
    }

    /// Case-insensitive exact lookup; no fuzzy matching.
    pub fn price_of(&self, product: &str) -> Option<Decimal> {
        self.prices.get(&product.to_lowercase()).copied()
    }
}
