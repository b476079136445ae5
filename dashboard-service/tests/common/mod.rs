#![allow(dead_code)]

use dashboard_service::config::{
    AuthSettings, BackendSettings, LinkSettings, ObservabilitySettings, OcrSettings,
    PricingSettings, ServerSettings, Settings, UploadSettings, ZohoSettings,
};
use dashboard_service::startup::Application;
use reqwest::{redirect, Client};
use secrecy::Secret;
use wiremock::MockServer;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: Client,
    /// Stands in for the order-processing backend.
    pub backend: MockServer,
    /// Stands in for both Zoho accounts and Zoho Books.
    pub zoho: MockServer,
}

pub fn test_settings(backend_url: &str, zoho_url: &str) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cookie_secure: false,
        },
        observability: ObservabilitySettings::default(),
        backend: BackendSettings {
            url: backend_url.to_string(),
            timeout_secs: 2,
        },
        zoho: ZohoSettings {
            accounts_url: zoho_url.to_string(),
            books_url: format!("{}/books/v3", zoho_url),
            client_id: "test-client".to_string(),
            client_secret: Secret::new("test-secret".to_string()),
            refresh_token: Secret::new("test-refresh".to_string()),
            organization_id: Some("60000001".to_string()),
            refresh_margin_secs: 300,
            timeout_secs: 2,
        },
        uploads: UploadSettings {
            max_screenshot_bytes: 64 * 1024,
            max_pdf_bytes: 64 * 1024,
            max_batch_files: 3,
            max_audio_bytes: 64 * 1024,
        },
        auth: AuthSettings::default(),
        ocr: OcrSettings::default(),
        pricing: PricingSettings::default(),
        links: LinkSettings::default(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let backend = MockServer::start().await;
        let zoho = MockServer::start().await;

        let settings = test_settings(&backend.uri(), &zoho.uri());
        let app = Application::build(settings)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to build client");

        // Wait for the server by polling the health endpoint
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            backend,
            zoho,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_text(&self, text: &str) -> reqwest::Response {
        let form = reqwest::multipart::Form::new().text("text", text.to_string());
        self.client
            .post(self.url("/api/process-sms"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
