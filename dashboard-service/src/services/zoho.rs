//! Zoho Books client with a process-wide OAuth access-token cache.

use crate::config::ZohoSettings;
use crate::error::UpstreamError;
use crate::models::{CatalogItem, Customer};
use crate::services::decode_response;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize};
use service_core::observability::TracePropagation;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const ACCOUNTS: &str = "zoho-accounts";
const BOOKS: &str = "zoho-books";

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Zoho answers token errors with HTTP 200 and an `error` field.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default)]
    expires_in: u64,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BooksEnvelope {
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ContactsPage {
    #[serde(default, alias = "customers")]
    contacts: Vec<Customer>,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    #[serde(default)]
    items: Vec<CatalogItem>,
}

pub struct ZohoClient {
    client: Client,
    settings: ZohoSettings,
    /// Held across the refresh so concurrent callers wait for one refresh
    /// instead of each issuing their own.
    token: Mutex<Option<CachedToken>>,
}

impl ZohoClient {
    pub fn new(settings: ZohoSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            settings,
            token: Mutex::new(None),
        })
    }

    /// Cached access token, refreshed when missing or expired.
    pub async fn access_token(&self) -> Result<String, UpstreamError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.access_token.clone());
        }

        let fresh = self.refresh_token().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }

    /// Drop the cached token so the next call refreshes.
    pub async fn invalidate_token(&self) {
        self.token.lock().await.take();
    }

    async fn refresh_token(&self) -> Result<CachedToken, UpstreamError> {
        let url = format!(
            "{}/oauth/v2/token",
            self.settings.accounts_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .query(&[
                ("refresh_token", self.settings.refresh_token.expose_secret().as_str()),
                ("client_id", self.settings.client_id.as_str()),
                ("client_secret", self.settings.client_secret.expose_secret().as_str()),
                ("grant_type", "refresh_token"),
            ])
            .propagate_trace(None)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: ACCOUNTS,
                source,
            })?;

        let token: TokenResponse = decode_response(ACCOUNTS, response).await?;

        if let Some(error) = token.error {
            return Err(UpstreamError::TokenRefresh(error));
        }
        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| UpstreamError::TokenRefresh("response had no access_token".into()))?;

        let lifetime = token
            .expires_in
            .saturating_sub(self.settings.refresh_margin_secs);

        tracing::info!(lifetime_secs = lifetime, "Refreshed Zoho access token");

        Ok(CachedToken {
            access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        })
    }

    async fn books_get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, UpstreamError> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.settings.books_url.trim_end_matches('/'), path);

        let mut request = self
            .client
            .get(&url)
            .header("Authorization", format!("Zoho-oauthtoken {}", token))
            .query(query);
        if let Some(organization_id) = &self.settings.organization_id {
            request = request.query(&[("organization_id", organization_id.as_str())]);
        }

        let response = request
            .propagate_trace(None)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: BOOKS,
                source,
            })?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
        }

        let body: serde_json::Value = decode_response(BOOKS, response).await?;

        let envelope: BooksEnvelope =
            serde_json::from_value(body.clone()).map_err(|e| UpstreamError::Decode {
                service: BOOKS,
                message: e.to_string(),
            })?;
        if envelope.code != 0 {
            return Err(UpstreamError::Zoho {
                code: envelope.code,
                message: envelope.message,
            });
        }

        serde_json::from_value(body).map_err(|e| UpstreamError::Decode {
            service: BOOKS,
            message: e.to_string(),
        })
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, UpstreamError> {
        let page: ContactsPage = self
            .books_get("/contacts", &[("contact_type", "customer")])
            .await?;
        Ok(page.contacts)
    }

    pub async fn list_items(&self) -> Result<Vec<CatalogItem>, UpstreamError> {
        let page: ItemsPage = self.books_get("/items", &[]).await?;
        Ok(page.items)
    }
}
