use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use lessonbook_api::app::{self, services::{self, StoreHandle}};
use lessonbook_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    lessonbook_observability::init(config.log.format, &config.log.filter);

    let handle = StoreHandle::new();
    tokio::spawn({
        let handle = handle.clone();
        let config = config.clone();
        async move {
            match services::build_services(&config).await {
                Ok(services) => {
                    handle.set(Arc::new(services));
                    tracing::info!("store ready");
                }
                Err(e) => tracing::error!(error = %e, "store startup failed; core routes stay unavailable"),
            }
        }
    });

    let app = app::build_app(handle, &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
