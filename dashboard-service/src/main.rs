use dashboard_service::config::{get_configuration, SERVICE_NAME};
use dashboard_service::services::metrics::init_metrics;
use dashboard_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = get_configuration()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_tracing(
        SERVICE_NAME,
        &settings.observability.log_level,
        settings.observability.otlp_endpoint.as_deref(),
    )?;
    init_metrics()?;

    let application = Application::build(settings).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        anyhow::anyhow!("Failed to build application: {}", e)
    })?;

    application.run_until_stopped().await?;
    Ok(())
}
