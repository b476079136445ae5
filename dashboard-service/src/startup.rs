//! Router assembly and server lifecycle.

use crate::config::Settings;
use crate::handlers::{
    app::{health_check, metrics_endpoint},
    auth::{login, login_form, login_page, logout, logout_page, update_password},
    catalog::{list_customers, list_items, zoho_customers, zoho_items},
    documents::{process_folder_pdfs, process_voice, upload_process_pdf},
    orders::{
        add_item, finalize_order, finalize_po, get_order, mark_ready, process_sms, remove_item,
        select_product, update_customer, update_item,
    },
    pages::{ai_page, dashboard_page, order_manually_page, reader_page},
};
use crate::middleware::require_token;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Room for the non-file parts and multipart framing on upload routes.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let uploads = &state.settings.uploads;
    let screenshot_limit = uploads.max_screenshot_bytes + FORM_OVERHEAD_BYTES;
    let pdf_limit = uploads.max_pdf_bytes + FORM_OVERHEAD_BYTES;
    let batch_limit = uploads
        .max_pdf_bytes
        .saturating_mul(uploads.max_batch_files)
        .saturating_add(FORM_OVERHEAD_BYTES);
    let audio_limit = uploads.max_audio_bytes + FORM_OVERHEAD_BYTES;

    let auth_settings = Arc::new(state.settings.auth.clone());

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/update-password", put(update_password))
        .route("/customers", get(list_customers))
        .route("/items", get(list_items))
        .route("/zoho-customers", get(zoho_customers))
        .route("/zoho-items", get(zoho_items))
        .route(
            "/process-sms",
            post(process_sms).layer(DefaultBodyLimit::max(screenshot_limit)),
        )
        .route(
            "/upload-process-pdf",
            post(upload_process_pdf).layer(DefaultBodyLimit::max(pdf_limit)),
        )
        .route(
            "/process-folder-pdfs",
            post(process_folder_pdfs).layer(DefaultBodyLimit::max(batch_limit)),
        )
        .route(
            "/voice",
            post(process_voice).layer(DefaultBodyLimit::max(audio_limit)),
        )
        .route("/finalize-po", post(finalize_po))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/items", post(add_item))
        .route(
            "/orders/:id/items/:item_id",
            patch(update_item).delete(remove_item),
        )
        .route("/orders/:id/items/:item_id/product", put(select_product))
        .route("/orders/:id/customer", patch(update_customer))
        .route("/orders/:id/ready", post(mark_ready))
        .route("/orders/:id/finalize", post(finalize_order));

    Router::new()
        .route("/", get(login_page))
        .route("/login", post(login_form))
        .route("/logout", get(logout_page))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/pages/dashboard", get(dashboard_page))
        .route("/pages/order-manually", get(order_manually_page))
        .route("/pages/ai-page", get(ai_page))
        .route("/pages/:reader", get(reader_page))
        .nest("/api", api)
        .layer(from_fn_with_state(auth_settings, require_token))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Outermost so the id is set before the trace span reads it.
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Bound listener plus router, ready to serve.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let state = AppState::new(settings)?;

        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind {}: {}", address, e);
            e
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        tracing::info!("Dashboard listening on port {}", self.port);
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
