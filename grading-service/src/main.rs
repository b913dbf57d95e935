use grading_service::config::GradingConfig;
use grading_service::services::init_metrics;
use grading_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = GradingConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "grading-service",
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );

    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start grading-service: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    app.run_until_stopped().await
}
