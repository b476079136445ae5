use crate::handlers::request_id;
use crate::models::{CatalogItem, CustomerSummary};
use crate::AppState;
use axum::{extract::State, Extension, Json};
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;
use service_core::middleware::RequestId;

/// Customer list from the backend, relayed unchanged.
pub async fn list_customers(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
) -> Result<Json<Value>, AppError> {
    let customers = state
        .backend
        .get("/api/customers", request_id(&request_id_ext))
        .await?;
    Ok(Json(customers))
}

/// Item list from the backend, relayed unchanged.
pub async fn list_items(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
) -> Result<Json<Value>, AppError> {
    let items = state
        .backend
        .get("/api/items", request_id(&request_id_ext))
        .await?;
    Ok(Json(items))
}

#[derive(Debug, Serialize)]
pub struct ZohoCustomersResponse {
    pub customers: Vec<CustomerSummary>,
}

pub async fn zoho_customers(
    State(state): State<AppState>,
) -> Result<Json<ZohoCustomersResponse>, AppError> {
    let customers: Vec<CustomerSummary> = state
        .zoho
        .list_customers()
        .await?
        .iter()
        .map(|customer| customer.summary())
        .collect();

    tracing::debug!(count = customers.len(), "Fetched Zoho customers");
    Ok(Json(ZohoCustomersResponse { customers }))
}

#[derive(Debug, Serialize)]
pub struct ZohoItemsResponse {
    pub items: Vec<CatalogItem>,
}

pub async fn zoho_items(State(state): State<AppState>) -> Result<Json<ZohoItemsResponse>, AppError> {
    let items = state.zoho.list_items().await?;
    tracing::debug!(count = items.len(), "Fetched Zoho items");
    Ok(Json(ZohoItemsResponse { items }))
}
