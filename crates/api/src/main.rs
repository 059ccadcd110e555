use anyhow::Context;
use tracing::{info, info_span, Instrument};

use warehouse_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    warehouse_observability::init(&config.log_level);

    let span = info_span!(
        "inventory",
        release = %config.version,
        service = "inventory",
        environment = %config.environment,
    );
    run(config).instrument(span).await
}

async fn run(config: Config) -> anyhow::Result<()> {
    let services = warehouse_api::app::services::build_services(&config).await?;
    let app = warehouse_api::app::build_app(services, config.backend_timeout);

    let listener = tokio::net::TcpListener::bind(&config.listen_address)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_address))?;

    info!(
        addr = %listener.local_addr()?,
        backend_timeout_ms = config.backend_timeout.as_millis() as u64,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")
}
