use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingAddress {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl BillingAddress {
    /// `"<address>, <city>, <state> <zip>"`, skipping empty parts.
    pub fn one_line(&self) -> String {
        let part = |value: &Option<String>| value.as_deref().unwrap_or("").trim().to_string();

        let state_zip = [part(&self.state), part(&self.zip)]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        [part(&self.address), part(&self.city), state_zip]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Customer record as held by the accounting backend (Zoho contact shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(alias = "customer_id")]
    pub contact_id: String,
    #[serde(alias = "customer_name")]
    pub contact_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub mobile: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub billing_address: Option<BillingAddress>,
}

impl Customer {
    pub fn summary(&self) -> CustomerSummary {
        CustomerSummary {
            id: self.contact_id.clone(),
            name: self.contact_name.clone(),
            email: self.email.clone().unwrap_or_default(),
            phone: self
                .phone
                .clone()
                .filter(|p| !p.is_empty())
                .or_else(|| self.mobile.clone())
                .unwrap_or_default(),
            address: self
                .billing_address
                .as_ref()
                .map(BillingAddress::one_line)
                .unwrap_or_default(),
        }
    }
}

/// Flattened customer used by the customer picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

/// Product as listed by the accounting backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_id: String,
    pub name: String,
    #[serde(default)]
    pub rate: Option<Decimal>,
}
