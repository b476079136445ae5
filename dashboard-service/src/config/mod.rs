use rust_decimal::Decimal;
use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;
use std::collections::HashMap;

pub const SERVICE_NAME: &str = "dashboard-service";

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
    pub backend: BackendSettings,
    pub zoho: ZohoSettings,
    #[serde(default)]
    pub uploads: UploadSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub ocr: OcrSettings,
    #[serde(default)]
    pub pricing: PricingSettings,
    #[serde(default)]
    pub links: LinkSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark auth cookies `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Deserialize, Clone)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector (e.g. http://tempo:4317). Traces are not exported when unset.
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the order-processing backend (PDF, voice, customers, finalize).
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone)]
pub struct ZohoSettings {
    #[serde(default = "default_zoho_accounts_url")]
    pub accounts_url: String,
    #[serde(default = "default_zoho_books_url")]
    pub books_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "empty_secret")]
    pub client_secret: Secret<String>,
    #[serde(default = "empty_secret")]
    pub refresh_token: Secret<String>,
    pub organization_id: Option<String>,
    /// Seconds shaved off `expires_in` so a token is never used right at expiry.
    #[serde(default = "default_refresh_margin_secs")]
    pub refresh_margin_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_zoho_accounts_url() -> String {
    "https://accounts.zoho.com".to_string()
}

fn default_zoho_books_url() -> String {
    "https://books.zoho.com/api/v3".to_string()
}

fn default_refresh_margin_secs() -> u64 {
    300
}

fn empty_secret() -> Secret<String> {
    Secret::new(String::new())
}

#[derive(Deserialize, Clone, Debug)]
pub struct UploadSettings {
    pub max_screenshot_bytes: usize,
    pub max_pdf_bytes: usize,
    pub max_batch_files: usize,
    pub max_audio_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_screenshot_bytes: 10 * 1024 * 1024,
            max_pdf_bytes: 50 * 1024 * 1024,
            max_batch_files: 20,
            max_audio_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct AuthSettings {
    /// Path prefixes that require the `token` cookie.
    pub protected_prefixes: Vec<String>,
    /// Where requests without a token are sent.
    pub login_path: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            protected_prefixes: [
                "/pages/dashboard",
                "/pages/order-manually",
                "/pages/ai-page",
                "/pages/po-sms-text",
                "/pages/po-sms-screenshot",
                "/pages/upload-pdf",
                "/pages/upload-voice",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            login_path: "/".to_string(),
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OcrMode {
    /// Return the canned sample order; no image analysis.
    #[default]
    Static,
    /// POST the image to `ocr.endpoint` and read `{"text": ...}`.
    Http,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct OcrSettings {
    #[serde(default)]
    pub mode: OcrMode,
    pub endpoint: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct PricingSettings {
    /// Extra or overriding entries for the product price table, keyed by product name.
    #[serde(default)]
    pub products: HashMap<String, Decimal>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LinkSettings {
    #[serde(default)]
    pub manual_booking: Vec<BookingLink>,
}

/// External Zoho Creator form and report for one kind of manual booking.
#[derive(Deserialize, Clone, Debug)]
pub struct BookingLink {
    pub id: String,
    pub title: String,
    pub description: String,
    pub form_url: String,
    pub list_url: String,
}

/// Environment names kept from the previous deployment, mapped onto config keys.
const LEGACY_ENV: &[(&str, &[&str])] = &[
    (
        "backend.url",
        &[
            "API_BASE_URL",
            "NEXT_PUBLIC_API_BASE_URL",
            "BASE_URL",
            "NEXT_PUBLIC_BASE_URL",
        ],
    ),
    (
        "zoho.client_id",
        &["ZOHO_CLIENT_ID", "NEXT_PUBLIC_ZOHO_CLIENT_ID"],
    ),
    (
        "zoho.client_secret",
        &["ZOHO_CLIENT_SECRET", "NEXT_PUBLIC_ZOHO_CLIENT_SECRET"],
    ),
    (
        "zoho.refresh_token",
        &["ZOHO_REFRESH_TOKEN", "NEXT_PUBLIC_ZOHO_REFRESH_TOKEN"],
    ),
];

/// First non-empty value among `names`.
fn first_env<F>(names: &[&str], lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
}

pub fn get_configuration() -> Result<Settings, AppError> {
    let mut builder = service_core::config::builder(SERVICE_NAME)?;

    for (key, names) in LEGACY_ENV {
        builder =
            builder.set_override_option(*key, first_env(names, |name| std::env::var(name).ok()))?;
    }

    let settings = builder.build()?;
    Ok(settings.try_deserialize::<Settings>()?)
}
