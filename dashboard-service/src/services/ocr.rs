use crate::error::UpstreamError;
use crate::models::UploadedFile;
use crate::services::{backend_client::file_part, decode_response};
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;
use serde::Deserialize;
use service_core::observability::TracePropagation;
use std::time::Duration;

/// Text recognition for order screenshots.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, image: UploadedFile) -> Result<String, UpstreamError>;
    fn name(&self) -> &'static str;
}

/// Sample order returned for every screenshot while no OCR service is wired up.
pub const SAMPLE_ORDER_TEXT: &str = "Total Wines\nRoyal Stage 1L: 5\nOld Monk 500ml: 10";

#[derive(Debug, Default)]
pub struct StaticOcr;

#[async_trait]
impl OcrEngine for StaticOcr {
    async fn extract_text(&self, image: UploadedFile) -> Result<String, UpstreamError> {
        tracing::warn!(
            file_name = %image.file_name,
            size = image.size(),
            "Static OCR in use; returning sample order text"
        );
        Ok(SAMPLE_ORDER_TEXT.to_string())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[derive(Debug, Deserialize)]
struct OcrResponse {
    text: String,
}

/// Posts the image as multipart field `image` and expects `{"text": "..."}`.
pub struct HttpOcr {
    client: Client,
    endpoint: String,
}

impl HttpOcr {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }
}

#[async_trait]
impl OcrEngine for HttpOcr {
    async fn extract_text(&self, mut image: UploadedFile) -> Result<String, UpstreamError> {
        image.field_name = "image".to_string();
        let form = Form::new().part("image", file_part(image)?);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .propagate_trace(None)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: "ocr",
                source,
            })?;

        let body: OcrResponse = decode_response("ocr", response).await?;
        Ok(body.text)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
