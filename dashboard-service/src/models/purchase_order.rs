//! Purchase order drafted from parsed input and edited before hand-off to Zoho Books.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrderError;
use crate::models::CatalogItem;

/// Purchase order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PoStatus {
    #[default]
    Draft,
    Ready,
    Sent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    /// Zoho contact id once the customer was matched against the accounting backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
}

pub fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn new_order_id() -> String {
    format!("PO-{}", Uuid::new_v4().simple())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn line_total(quantity: u32, unit_price: Decimal) -> Result<Decimal, OrderError> {
    Decimal::from(quantity)
        .checked_mul(unit_price)
        .ok_or(OrderError::AmountOverflow)
}

fn sum_totals<I>(totals: I) -> Result<Decimal, OrderError>
where
    I: IntoIterator<Item = Decimal>,
{
    totals.into_iter().try_fold(Decimal::ZERO, |sum, total| {
        sum.checked_add(total).ok_or(OrderError::AmountOverflow)
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default = "new_item_id")]
    pub id: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Decimal,
    /// Derived. Whatever a client sends here is overwritten by [`LineItem::recalculate`].
    #[serde(default)]
    pub total_price: Decimal,
}

impl LineItem {
    pub fn new(
        product: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<Self, OrderError> {
        Ok(Self {
            id: new_item_id(),
            product: product.into(),
            quantity,
            unit_price,
            total_price: line_total(quantity, unit_price)?,
        })
    }

    /// Blank row added from the editor.
    pub fn blank() -> Self {
        Self {
            id: new_item_id(),
            product: String::new(),
            quantity: 1,
            unit_price: Decimal::ZERO,
            total_price: Decimal::ZERO,
        }
    }

    /// Leaves the item untouched when the total does not fit a `Decimal`.
    pub fn recalculate(&mut self) -> Result<(), OrderError> {
        self.total_price = line_total(self.quantity, self.unit_price)?;
        Ok(())
    }
}

/// A single editable field of a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum ItemField {
    Product(String),
    Quantity(u32),
    UnitPrice(Decimal),
}

/// Customer edit. `name` always replaces; other fields only when non-empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(default = "new_order_id")]
    pub id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_details: CustomerDetails,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub status: PoStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PurchaseOrder {
    /// New draft dated today with totals already computed.
    pub fn draft(
        customer_name: impl Into<String>,
        items: Vec<LineItem>,
    ) -> Result<Self, OrderError> {
        let customer_name = customer_name.into();
        let mut order = Self {
            id: new_order_id(),
            customer_details: CustomerDetails {
                name: customer_name.clone(),
                ..CustomerDetails::default()
            },
            customer_name,
            items,
            total_amount: Decimal::ZERO,
            date: today(),
            status: PoStatus::Draft,
            notes: None,
        };
        order.recalculate()?;
        Ok(order)
    }

    pub fn is_sent(&self) -> bool {
        self.status == PoStatus::Sent
    }

    /// Recompute every item total and the grand total from quantities and
    /// unit prices. On overflow nothing is written.
    pub fn recalculate(&mut self) -> Result<(), OrderError> {
        let mut items = self.items.clone();
        for item in &mut items {
            item.recalculate()?;
        }
        let total = sum_totals(items.iter().map(|item| item.total_price))?;

        self.items = items;
        self.total_amount = total;
        Ok(())
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), OrderError> {
        if self.is_sent() {
            return Err(OrderError::AlreadySent(self.id.clone()));
        }
        Ok(())
    }

    fn item_index(&self, item_id: &str) -> Result<usize, OrderError> {
        self.items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or_else(|| OrderError::ItemNotFound(item_id.to_string()))
    }

    /// Apply `change` to a copy of the item and commit it only once both the
    /// item total and the order total are known.
    fn change_item<F>(&mut self, item_id: &str, change: F) -> Result<&LineItem, OrderError>
    where
        F: FnOnce(&mut LineItem),
    {
        self.ensure_editable()?;
        let index = self.item_index(item_id)?;

        let mut item = self.items[index].clone();
        change(&mut item);
        item.recalculate()?;

        let total = sum_totals(self.items.iter().enumerate().map(|(i, existing)| {
            if i == index {
                item.total_price
            } else {
                existing.total_price
            }
        }))?;

        self.items[index] = item;
        self.total_amount = total;
        Ok(&self.items[index])
    }

    pub fn add_item(&mut self) -> Result<&LineItem, OrderError> {
        self.ensure_editable()?;
        self.items.push(LineItem::blank());
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn remove_item(&mut self, item_id: &str) -> Result<LineItem, OrderError> {
        self.ensure_editable()?;
        let index = self.item_index(item_id)?;
        let total = sum_totals(
            self.items
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, item)| item.total_price),
        )?;

        let removed = self.items.remove(index);
        self.total_amount = total;
        Ok(removed)
    }

    pub fn update_item(&mut self, item_id: &str, field: ItemField) -> Result<&LineItem, OrderError> {
        self.change_item(item_id, |item| match field {
            ItemField::Product(product) => item.product = product,
            ItemField::Quantity(quantity) => item.quantity = quantity,
            ItemField::UnitPrice(unit_price) => item.unit_price = unit_price,
        })
    }

    /// Replace product and price with a catalog entry; a missing rate prices at 0.
    pub fn select_product(
        &mut self,
        item_id: &str,
        catalog_item: &CatalogItem,
    ) -> Result<&LineItem, OrderError> {
        self.change_item(item_id, |item| {
            item.product = catalog_item.name.clone();
            item.unit_price = catalog_item.rate.unwrap_or_default();
        })
    }

    pub fn update_customer(&mut self, update: CustomerUpdate) -> Result<(), OrderError> {
        self.ensure_editable()?;

        fn merge(target: &mut String, value: Option<String>) {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                *target = value;
            }
        }

        let details = &mut self.customer_details;
        details.name = update.name.clone();
        merge(&mut details.phone, update.phone);
        merge(&mut details.email, update.email);
        merge(&mut details.address, update.address);
        if let Some(contact_id) = update.contact_id.filter(|v| !v.is_empty()) {
            details.contact_id = Some(contact_id);
        }
        self.customer_name = update.name;
        Ok(())
    }

    pub fn mark_ready(&mut self) -> Result<(), OrderError> {
        self.ensure_editable()?;
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        self.status = PoStatus::Ready;
        Ok(())
    }

    pub fn mark_sent(&mut self) {
        self.status = PoStatus::Sent;
    }

    /// Checks and stamps applied before an order is handed to the backend:
    /// totals recomputed, dated today, and the order id as the reference note.
    pub fn prepare_for_finalize(&mut self) -> Result<(), OrderError> {
        self.ensure_editable()?;
        if self.items.is_empty() {
            return Err(OrderError::NoItems);
        }
        self.recalculate()?;
        self.date = today();
        self.notes = Some(format!("PO Reference: {}", self.id));
        Ok(())
    }

    pub fn item(&self, item_id: &str) -> Result<&LineItem, OrderError> {
        self.items
            .iter()
            .find(|item| item.id == item_id)
            .ok_or_else(|| OrderError::ItemNotFound(item_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_order() -> PurchaseOrder {
        PurchaseOrder::draft(
            "Total Wines",
            vec![
                LineItem::new("Royal Stage 1L", 5, dec("25.99")).unwrap(),
                LineItem::new("Old Monk 500ml", 10, dec("15.99")).unwrap(),
            ],
        )
        .unwrap()
    }

    /// Large enough that ten of them overflow a `Decimal`.
    fn huge_price() -> Decimal {
        dec("10000000000000000000000000000")
    }

    fn assert_consistent(order: &PurchaseOrder) {
        for item in &order.items {
            assert_eq!(item.total_price, Decimal::from(item.quantity) * item.unit_price);
        }
        let sum: Decimal = order.items.iter().map(|i| i.total_price).sum();
        assert_eq!(order.total_amount, sum);
    }

    #[test]
    fn draft_computes_totals() {
        let order = sample_order();
        assert_eq!(order.status, PoStatus::Draft);
        assert_eq!(order.total_amount, dec("289.85"));
        assert_eq!(order.customer_details.name, "Total Wines");
        assert!(order.id.starts_with("PO-"));
    }

    #[test]
    fn quantity_edit_recomputes_item_and_order() {
        let mut order = sample_order();
        let id = order.items[0].id.clone();

        let item = order.update_item(&id, ItemField::Quantity(2)).unwrap();
        assert_eq!(item.total_price, dec("51.98"));
        assert_eq!(order.total_amount, dec("211.88"));
        assert_consistent(&order);
    }

    #[test]
    fn unit_price_edit_recomputes() {
        let mut order = sample_order();
        let id = order.items[1].id.clone();

        order.update_item(&id, ItemField::UnitPrice(dec("10"))).unwrap();
        assert_eq!(order.total_amount, dec("229.95"));
        assert_consistent(&order);
    }

    #[test]
    fn add_and_remove_items() {
        let mut order = sample_order();

        let added = order.add_item().unwrap().clone();
        assert_eq!(added.product, "");
        assert_eq!(added.quantity, 1);
        assert_eq!(added.total_price, Decimal::ZERO);
        assert_eq!(order.items.len(), 3);

        let first = order.items[0].id.clone();
        order.remove_item(&first).unwrap();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, dec("159.90"));
        assert_consistent(&order);
    }

    #[test]
    fn unknown_item_is_reported() {
        let mut order = sample_order();
        assert_eq!(
            order.remove_item("missing"),
            Err(OrderError::ItemNotFound("missing".into()))
        );
    }

    #[test]
    fn select_product_takes_catalog_rate() {
        let mut order = sample_order();
        let id = order.add_item().unwrap().id.clone();
        order.update_item(&id, ItemField::Quantity(3)).unwrap();

        let catalog_item = CatalogItem {
            item_id: "460000000038080".into(),
            name: "Bacardi 750ml".into(),
            rate: Some(dec("19.99")),
        };
        let item = order.select_product(&id, &catalog_item).unwrap();
        assert_eq!(item.product, "Bacardi 750ml");
        assert_eq!(item.total_price, dec("59.97"));
        assert_consistent(&order);

        let unpriced = CatalogItem {
            rate: None,
            ..catalog_item
        };
        order.select_product(&id, &unpriced).unwrap();
        assert_eq!(order.item(&id).unwrap().unit_price, Decimal::ZERO);
    }

    #[test]
    fn customer_update_keeps_existing_fields_when_blank() {
        let mut order = sample_order();
        order
            .update_customer(CustomerUpdate {
                name: "ABC Liquor".into(),
                phone: Some("555-0100".into()),
                email: Some("orders@abcliquor.com".into()),
                ..Default::default()
            })
            .unwrap();

        order
            .update_customer(CustomerUpdate {
                name: "ABC Liquor Store".into(),
                phone: Some(String::new()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(order.customer_name, "ABC Liquor Store");
        assert_eq!(order.customer_details.name, "ABC Liquor Store");
        assert_eq!(order.customer_details.phone, "555-0100");
        assert_eq!(order.customer_details.email, "orders@abcliquor.com");
    }

    #[test]
    fn finalize_ignores_client_totals() {
        let mut order: PurchaseOrder = serde_json::from_value(serde_json::json!({
            "id": "PO-1700000000000",
            "customerName": "Total Wines",
            "items": [
                { "id": "a", "product": "Royal Stage 1L", "quantity": 5, "unitPrice": 25.99, "totalPrice": 1 }
            ],
            "totalAmount": 1,
            "date": "2024-01-01",
            "status": "ready"
        }))
        .unwrap();

        order.prepare_for_finalize().unwrap();

        assert_eq!(order.total_amount, dec("129.95"));
        assert_eq!(order.notes.as_deref(), Some("PO Reference: PO-1700000000000"));
        assert_eq!(order.date, today());
    }

    #[test]
    fn finalize_replaces_client_notes_with_reference() {
        let mut order = sample_order();
        order.notes = Some("deliver after 5pm".into());
        order.prepare_for_finalize().unwrap();
        assert_eq!(order.notes, Some(format!("PO Reference: {}", order.id)));
    }

    #[test]
    fn overflowing_unit_price_leaves_order_unchanged() {
        let mut order = sample_order();
        let before = order.clone();
        let id = order.items[1].id.clone();

        assert_eq!(
            order.update_item(&id, ItemField::UnitPrice(huge_price())),
            Err(OrderError::AmountOverflow)
        );
        assert_eq!(order, before);
    }

    #[test]
    fn overflowing_catalog_rate_leaves_order_unchanged() {
        let mut order = sample_order();
        let before = order.clone();
        let id = order.items[1].id.clone();

        let catalog_item = CatalogItem {
            item_id: "1".into(),
            name: "Gold Reserve".into(),
            rate: Some(huge_price()),
        };
        assert_eq!(
            order.select_product(&id, &catalog_item).map(|_| ()),
            Err(OrderError::AmountOverflow)
        );
        assert_eq!(order, before);
    }

    #[test]
    fn overflowing_order_total_is_rejected() {
        let max = Decimal::MAX;
        let mut order = PurchaseOrder::draft(
            "Total Wines",
            vec![LineItem::new("A", 1, max).unwrap()],
        )
        .unwrap();
        let id = order.add_item().unwrap().id.clone();
        let before = order.clone();

        assert_eq!(
            order.update_item(&id, ItemField::UnitPrice(max)).map(|_| ()),
            Err(OrderError::AmountOverflow)
        );
        assert_eq!(order, before);
        assert_eq!(
            PurchaseOrder::draft(
                "Total Wines",
                vec![before.items[0].clone(), before.items[0].clone()],
            ),
            Err(OrderError::AmountOverflow)
        );
    }

    #[test]
    fn finalize_rejects_overflowing_client_order() {
        let mut order: PurchaseOrder = serde_json::from_value(serde_json::json!({
            "customerName": "Total Wines",
            "items": [{ "product": "Gold Reserve", "quantity": 10, "unitPrice": 1e28 }]
        }))
        .unwrap();

        assert_eq!(order.prepare_for_finalize(), Err(OrderError::AmountOverflow));
    }

    #[test]
    fn finalize_requires_items() {
        let mut order = PurchaseOrder::draft("Total Wines", Vec::new()).unwrap();
        assert_eq!(order.prepare_for_finalize(), Err(OrderError::NoItems));
    }

    #[test]
    fn sent_orders_reject_edits() {
        let mut order = sample_order();
        order.mark_ready().unwrap();
        order.mark_sent();

        let id = order.items[0].id.clone();
        assert!(matches!(order.add_item(), Err(OrderError::AlreadySent(_))));
        assert!(matches!(
            order.update_item(&id, ItemField::Quantity(1)),
            Err(OrderError::AlreadySent(_))
        ));
        assert!(matches!(order.remove_item(&id), Err(OrderError::AlreadySent(_))));
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn empty_order_cannot_become_ready() {
        let mut order = PurchaseOrder::draft("Unknown Customer", Vec::new()).unwrap();
        assert_eq!(order.mark_ready(), Err(OrderError::NoItems));
    }

    #[test]
    fn client_totals_are_not_trusted() {
        let mut order: PurchaseOrder = serde_json::from_value(serde_json::json!({
            "id": "PO-1",
            "customerName": "Total Wines",
            "customerDetails": { "name": "Total Wines" },
            "items": [
                { "id": "a", "product": "Royal Stage 1L", "quantity": 2, "unitPrice": 25.99, "totalPrice": 1 },
                { "product": "Old Monk", "quantity": 1, "unitPrice": 15.99 }
            ],
            "totalAmount": 1000000,
            "date": "2025-07-01",
            "status": "ready"
        }))
        .unwrap();

        order.recalculate().unwrap();
        assert_eq!(order.total_amount, dec("67.97"));
        assert!(!order.items[1].id.is_empty());
        assert_eq!(order.status, PoStatus::Ready);
    }

    #[test]
    fn serializes_wire_field_names() {
        let order = sample_order();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["customerName"], "Total Wines");
        assert_eq!(json["status"], "draft");
        assert_eq!(json["items"][0]["unitPrice"], 25.99);
        assert!(json["date"].as_str().unwrap().len() == 10);
    }

    #[test]
    fn item_field_wire_format() {
        let field: ItemField =
            serde_json::from_value(serde_json::json!({ "field": "unitPrice", "value": 4.5 })).unwrap();
        assert_eq!(field, ItemField::UnitPrice(dec("4.5")));
    }
}
