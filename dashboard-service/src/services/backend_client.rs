use crate::config::BackendSettings;
use crate::error::UpstreamError;
use crate::models::upload::UploadedFile;
use crate::services::decode_response;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use service_core::observability::TracePropagation;
use std::time::Duration;

pub(crate) const SERVICE: &str = "backend";

/// HTTP client for the order-processing backend.
///
/// Every call carries trace context and the caller's request id. Calls time
/// out after `backend.timeout_secs` and are never retried.
pub struct BackendClient {
    client: Client,
    settings: BackendSettings,
}

impl BackendClient {
    pub fn new(settings: BackendSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.url.trim_end_matches('/'), path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        request_id: Option<&str>,
    ) -> Result<T, UpstreamError> {
        let response = request
            .propagate_trace(request_id)
            .send()
            .await
            .map_err(|source| UpstreamError::Transport {
                service: SERVICE,
                source,
            })?;

        decode_response(SERVICE, response).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        request_id: Option<&str>,
    ) -> Result<T, UpstreamError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET backend");
        self.send(self.client.get(&url), request_id).await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%url, "POST backend");
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request, request_id).await
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        body: &B,
        bearer: Option<&str>,
        request_id: Option<&str>,
    ) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!(%url, "PUT backend");
        let mut request = self.client.put(&url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request, request_id).await
    }

    /// Forward uploaded files (and plain text fields) as a multipart form.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        files: Vec<UploadedFile>,
        fields: Vec<(String, String)>,
        request_id: Option<&str>,
    ) -> Result<T, UpstreamError> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        for file in files {
            let name = file.field_name.clone();
            form = form.part(name, file_part(file)?);
        }

        let url = self.url(path);
        tracing::debug!(%url, "POST multipart backend");
        self.send(self.client.post(&url).multipart(form), request_id)
            .await
    }
}

pub(crate) fn file_part(file: UploadedFile) -> Result<Part, UpstreamError> {
    Part::bytes(file.data.to_vec())
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|source| UpstreamError::Transport {
            service: SERVICE,
            source,
        })
}
