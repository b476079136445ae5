//! Purchase order as extracted by the backend from a voice note or transcript.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::OrderError;
use crate::models::{CustomerDetails, LineItem, PurchaseOrder};

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedItem {
    pub item_description: Option<String>,
    pub zoho_item_name: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<Decimal>,
}

/// Customer the backend matched in Zoho Books.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerMatch {
    pub contact_id: String,
    pub contact_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub cf_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedOrder {
    pub po_number: Option<String>,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
    pub order_date: Option<NaiveDate>,
    pub zoho_customer_match: Option<CustomerMatch>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl ExtractedOrder {
    /// Draft with the matched Zoho customer preferred over the spoken name.
    /// Quantity defaults to 1 and price to 0; totals are recomputed locally.
    pub fn into_draft(self) -> Result<PurchaseOrder, OrderError> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                let product = non_empty(item.item_description)
                    .or(non_empty(item.zoho_item_name))
                    .unwrap_or_default();
                LineItem::new(
                    product,
                    item.quantity.filter(|q| *q > 0).unwrap_or(1),
                    item.unit_price.unwrap_or_default(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let customer_details = match self.zoho_customer_match {
            Some(matched) => CustomerDetails {
                name: matched.contact_name,
                phone: matched.phone.unwrap_or_default(),
                email: non_empty(matched.email)
                    .or(matched.cf_email)
                    .unwrap_or_default(),
                address: String::new(),
                contact_id: non_empty(Some(matched.contact_id)),
            },
            None => CustomerDetails {
                name: self.customer_name.unwrap_or_default(),
                ..CustomerDetails::default()
            },
        };

        let mut order = PurchaseOrder::draft(customer_details.name.clone(), items)?;
        order.customer_details = customer_details;
        if let Some(po_number) = non_empty(self.po_number) {
            order.id = po_number;
        }
        if let Some(date) = self.order_date {
            order.date = date;
        }
        Ok(order)
    }
}
