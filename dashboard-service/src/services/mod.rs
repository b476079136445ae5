pub mod backend_client;
pub mod draft_store;
pub mod metrics;
pub mod ocr;
pub mod zoho;

pub use backend_client::BackendClient;
pub use draft_store::DraftStore;
pub use ocr::{HttpOcr, OcrEngine, StaticOcr};
pub use zoho::ZohoClient;

use crate::error::UpstreamError;
use serde::de::DeserializeOwned;

/// Decode a JSON response, turning non-success statuses into
/// [`UpstreamError::Status`] with whatever body the upstream sent.
/// An empty success body decodes as JSON `null`.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| UpstreamError::Transport { service, source })?;

    if !status.is_success() {
        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::json!({
                "message": String::from_utf8_lossy(&bytes).trim().to_string()
            })
        });
        return Err(UpstreamError::Status {
            service,
            status,
            body,
        });
    }

    let payload: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
    serde_json::from_slice(payload).map_err(|e| UpstreamError::Decode {
        service,
        message: e.to_string(),
    })
}
