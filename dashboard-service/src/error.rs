use crate::services::backend_client::SERVICE as BACKEND;
use axum::http::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order {0} not found")]
    OrderNotFound(String),

    #[error("Item {0} not found")]
    ItemNotFound(String),

    #[error("Order {0} has already been sent and can no longer be edited")]
    AlreadySent(String),

    #[error("Order {0} is already being submitted")]
    SubmitInProgress(String),

    #[error("Order has no items")]
    NoItems,

    #[error("Order amount is too large")]
    AmountOverflow,
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(_) | OrderError::ItemNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            OrderError::AlreadySent(_) | OrderError::SubmitInProgress(_) => {
                AppError::Conflict(err.to_string())
            }
            OrderError::NoItems | OrderError::AmountOverflow => {
                AppError::BadRequest(err.to_string())
            }
        }
    }
}

/// Failure talking to the backend, Zoho or the OCR endpoint.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: serde_json::Value,
    },

    #[error("{service} sent an unreadable response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("Zoho API error {code}: {message}")]
    Zoho { code: i64, message: String },

    #[error("Zoho token refresh failed: {0}")]
    TokenRefresh(String),
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        tracing::error!(error = %err, "Upstream call failed");
        match err {
            // Client errors from the backend carry a message meant for the user.
            UpstreamError::Status {
                service: BACKEND,
                status,
                body,
            } if status.is_client_error() => {
                AppError::Upstream { status, body }
            }
            UpstreamError::Transport { ref source, .. } if source.is_timeout() => {
                AppError::BadGateway(format!("{} (timed out)", err))
            }
            _ => AppError::BadGateway(err.to_string()),
        }
    }
}
