use crate::error::OrderError;
use crate::handlers::{bearer_token, request_id};
use crate::handlers::upload::{read_multipart, FileRule};
use crate::models::{CatalogItem, CustomerUpdate, ItemField, PoStatus, PurchaseOrder};
use crate::parser::parse_order_text;
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use service_core::error::AppError;
use service_core::middleware::RequestId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub message: &'static str,
    pub order_id: String,
    pub status: PoStatus,
}

impl FinalizeResponse {
    fn sent(order: PurchaseOrder) -> Self {
        Self {
            message: "PO finalized successfully",
            order_id: order.id,
            status: PoStatus::Sent,
        }
    }
}

/// Turn pasted SMS text, or a screenshot run through OCR, into a draft order.
pub async fn process_sms(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
    multipart: Multipart,
) -> Result<Json<PurchaseOrder>, AppError> {
    let rules = [FileRule::single(
        "screenshot",
        state.settings.uploads.max_screenshot_bytes,
    )];
    let mut form = read_multipart(multipart, &rules).await?;

    let (source, text) = if let Some(screenshot) = form.take_file("screenshot") {
        tracing::info!(
            request_id = ?request_id(&request_id_ext),
            file_name = %screenshot.file_name,
            size = screenshot.size(),
            engine = state.ocr.name(),
            "Running OCR on screenshot"
        );
        ("screenshot", state.ocr.extract_text(screenshot).await?)
    } else if let Some(text) = form.text("text") {
        ("text", text.to_string())
    } else {
        return Err(AppError::BadRequest(
            "No text or screenshot provided".to_string(),
        ));
    };

    let parsed = parse_order_text(&text, &state.catalog)?;
    if parsed.is_empty() {
        return Err(AppError::BadRequest(
            "No valid items found in the text".to_string(),
        ));
    }

    let order = state.drafts.insert(parsed.into_draft()?);
    tracing::info!(
        order_id = %order.id,
        customer = %order.customer_name,
        items = order.items.len(),
        total = %order.total_amount,
        "Drafted purchase order"
    );
    metrics::counter!("orders_drafted_total", "source" => source).increment(1);

    Ok(Json(order))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<PurchaseOrder>, AppError> {
    Ok(Json(state.drafts.get(&order_id)?))
}

pub async fn add_item(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<PurchaseOrder>), AppError> {
    let order = state
        .drafts
        .edit(&order_id, |order| order.add_item().map(|_| ()))?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(field): Json<ItemField>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let order = state
        .drafts
        .edit(&order_id, |order| order.update_item(&item_id, field).map(|_| ()))?;
    Ok(Json(order))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(String, String)>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let order = state
        .drafts
        .edit(&order_id, |order| order.remove_item(&item_id).map(|_| ()))?;
    Ok(Json(order))
}

pub async fn select_product(
    State(state): State<AppState>,
    Path((order_id, item_id)): Path<(String, String)>,
    Json(product): Json<CatalogItem>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let order = state.drafts.edit(&order_id, |order| {
        order.select_product(&item_id, &product).map(|_| ())
    })?;
    Ok(Json(order))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(update): Json<CustomerUpdate>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let order = state
        .drafts
        .edit(&order_id, |order| order.update_customer(update))?;
    Ok(Json(order))
}

pub async fn mark_ready(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let order = state.drafts.edit(&order_id, PurchaseOrder::mark_ready)?;
    Ok(Json(order))
}

/// Finalize a stored draft. The draft is claimed for the length of the
/// backend call, so edits and a second finalize meanwhile get 409; it is
/// marked sent only once the backend accepted it.
pub async fn finalize_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    jar: CookieJar,
    request_id_ext: Option<Extension<RequestId>>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let (order, submission) = state
        .drafts
        .begin_submit(&order_id)?
        .ok_or_else(|| OrderError::OrderNotFound(order_id.clone()))?;

    let sent = submit(&state, order, &jar, request_id(&request_id_ext)).await?;
    submission.complete(&sent);

    Ok(Json(FinalizeResponse::sent(sent)))
}

/// Finalize an order edited client-side and posted whole. A stored draft
/// with the same id is claimed the same way and replaced by what was sent.
pub async fn finalize_po(
    State(state): State<AppState>,
    jar: CookieJar,
    request_id_ext: Option<Extension<RequestId>>,
    Json(order): Json<PurchaseOrder>,
) -> Result<Json<FinalizeResponse>, AppError> {
    let submission = state
        .drafts
        .begin_submit(&order.id)?
        .map(|(_, submission)| submission);

    let sent = submit(&state, order, &jar, request_id(&request_id_ext)).await?;
    if let Some(submission) = submission {
        submission.complete(&sent);
    }

    Ok(Json(FinalizeResponse::sent(sent)))
}

/// Stamp and post the order; returns it exactly as the backend received it.
async fn submit(
    state: &AppState,
    mut order: PurchaseOrder,
    jar: &CookieJar,
    request_id: Option<&str>,
) -> Result<PurchaseOrder, AppError> {
    order.prepare_for_finalize()?;

    let _: serde_json::Value = state
        .backend
        .post(
            "/api/finalize-po",
            &order,
            bearer_token(jar, None).as_deref(),
            request_id,
        )
        .await?;

    tracing::info!(
        order_id = %order.id,
        total = %order.total_amount,
        items = order.items.len(),
        "Purchase order finalized"
    );
    metrics::counter!("orders_finalized_total").increment(1);

    Ok(order)
}
