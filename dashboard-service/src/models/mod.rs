pub mod catalog;
pub mod customer;
pub mod extracted;
pub mod menu;
pub mod purchase_order;
pub mod upload;

pub use catalog::PriceCatalog;
pub use customer::{BillingAddress, CatalogItem, Customer, CustomerSummary};
pub use extracted::ExtractedOrder;
pub use menu::{dashboard_menu, LinkKind, MenuItem, Reader};
pub use purchase_order::{
    CustomerDetails, CustomerUpdate, ItemField, LineItem, PoStatus, PurchaseOrder,
};
pub use upload::UploadedFile;
