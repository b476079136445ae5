use crate::handlers::request_id;
use crate::handlers::upload::{read_multipart, FileRule};
use crate::models::ExtractedOrder;
use crate::AppState;
use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde_json::Value;
use service_core::error::AppError;
use service_core::middleware::RequestId;

/// Single PDF purchase order, forwarded to the backend for extraction.
pub async fn upload_process_pdf(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let limits = &state.settings.uploads;
    let mut form = read_multipart(multipart, &[FileRule::single("pdf", limits.max_pdf_bytes)]).await?;

    let pdf = form
        .take_file("pdf")
        .ok_or_else(|| AppError::BadRequest("Please select a PDF file first".to_string()))?;
    if !pdf.is_pdf() {
        return Err(AppError::BadRequest(format!(
            "{} is not a PDF file",
            pdf.file_name
        )));
    }

    tracing::info!(file_name = %pdf.file_name, size = pdf.size(), "Forwarding PDF");
    metrics::counter!("documents_forwarded_total", "kind" => "pdf").increment(1);

    let result = state
        .backend
        .post_multipart(
            "/api/upload-process-pdf",
            vec![pdf],
            Vec::new(),
            request_id(&request_id_ext),
        )
        .await?;
    Ok(Json(result))
}

/// A batch of PDFs under the repeated `pdfs` field.
pub async fn process_folder_pdfs(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let limits = &state.settings.uploads;
    let rule = FileRule {
        field: "pdfs",
        max_bytes: limits.max_pdf_bytes,
        max_count: limits.max_batch_files,
    };
    let mut form = read_multipart(multipart, &[rule]).await?;

    let pdfs = form.take_files("pdfs");
    if pdfs.is_empty() {
        return Err(AppError::BadRequest(
            "Please select PDF file(s) first".to_string(),
        ));
    }
    if let Some(other) = pdfs.iter().find(|file| !file.is_pdf()) {
        return Err(AppError::BadRequest(format!(
            "{} is not a PDF file",
            other.file_name
        )));
    }

    let total_bytes: usize = pdfs.iter().map(|file| file.size()).sum();
    tracing::info!(count = pdfs.len(), total_bytes, "Forwarding PDF batch");
    metrics::counter!("documents_forwarded_total", "kind" => "pdf_batch").increment(1);

    let result = state
        .backend
        .post_multipart(
            "/api/process-folder-pdfs",
            pdfs,
            Vec::new(),
            request_id(&request_id_ext),
        )
        .await?;
    Ok(Json(result))
}

/// Voice note (`audio`) or typed transcript (`text`). The backend reply is
/// relayed; when it holds a `purchase_order`, a stored draft built from it is
/// added under `draft`.
pub async fn process_voice(
    State(state): State<AppState>,
    request_id_ext: Option<Extension<RequestId>>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let max_audio = state.settings.uploads.max_audio_bytes;
    let mut form = read_multipart(multipart, &[FileRule::single("audio", max_audio)]).await?;

    let (files, fields) = if let Some(audio) = form.take_file("audio") {
        if !audio.is_audio() {
            return Err(AppError::BadRequest(format!(
                "{} is not an audio file",
                audio.file_name
            )));
        }
        tracing::info!(file_name = %audio.file_name, size = audio.size(), "Forwarding voice note");
        (vec![audio], Vec::new())
    } else if let Some(text) = form.text("text") {
        (Vec::new(), vec![("text".to_string(), text.to_string())])
    } else {
        return Err(AppError::BadRequest(
            "Please either record/upload voice or enter text".to_string(),
        ));
    };
    metrics::counter!("documents_forwarded_total", "kind" => "voice").increment(1);

    let mut result: Value = state
        .backend
        .post_multipart("/api/voice", files, fields, request_id(&request_id_ext))
        .await?;

    let extracted = result
        .get("purchase_order")
        .cloned()
        .map(serde_json::from_value::<ExtractedOrder>);

    match extracted {
        Some(Ok(extracted)) => {
            let draft = state.drafts.insert(extracted.into_draft()?);
            tracing::info!(order_id = %draft.id, items = draft.items.len(), "Drafted order from voice");
            let draft_json = serde_json::to_value(&draft).map_err(anyhow::Error::from)?;
            if let Some(object) = result.as_object_mut() {
                object.insert("draft".to_string(), draft_json);
            }
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "Voice response had an unreadable purchase_order");
        }
        None => {}
    }

    Ok(Json(result))
}
