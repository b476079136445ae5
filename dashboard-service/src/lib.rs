pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod parser;
pub mod services;
pub mod startup;
pub mod utils;

use crate::config::{OcrMode, Settings};
use crate::models::PriceCatalog;
use crate::services::{BackendClient, DraftStore, HttpOcr, OcrEngine, StaticOcr, ZohoClient};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub backend: Arc<BackendClient>,
    pub zoho: Arc<ZohoClient>,
    pub ocr: Arc<dyn OcrEngine>,
    pub drafts: DraftStore,
    pub catalog: Arc<PriceCatalog>,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let backend = BackendClient::new(settings.backend.clone())?;
        let zoho = ZohoClient::new(settings.zoho.clone())?;

        let ocr: Arc<dyn OcrEngine> = match (settings.ocr.mode, &settings.ocr.endpoint) {
            (OcrMode::Http, Some(endpoint)) => {
                tracing::info!(%endpoint, "HTTP OCR engine initialized");
                Arc::new(HttpOcr::new(
                    endpoint.clone(),
                    Duration::from_secs(settings.backend.timeout_secs),
                )?)
            }
            (OcrMode::Http, None) => {
                tracing::warn!("OCR mode is http but no endpoint is set. Using static OCR.");
                Arc::new(StaticOcr)
            }
            (OcrMode::Static, _) => Arc::new(StaticOcr),
        };

        let catalog = PriceCatalog::with_overrides(
            settings
                .pricing
                .products
                .iter()
                .map(|(name, price)| (name.as_str(), *price)),
        );

        Ok(Self {
            settings: Arc::new(settings),
            backend: Arc::new(backend),
            zoho: Arc::new(zoho),
            ocr,
            drafts: DraftStore::new(),
            catalog: Arc::new(catalog),
        })
    }
}
