//! Canvass Server — application entry point.

use std::sync::Arc;

use canvass_access::AccessDecisionService;
use canvass_db::DbManager;
use canvass_db::repository::{
    SurrealAuditLogRepository, SurrealDeviceStateRepository, SurrealIdentityRepository,
};
use canvass_server::{ServerConfig, app, cors_layer};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("canvass=info".parse()?))
        .json()
        .init();

    tracing::info!("Starting canvass server...");

    let cfg = ServerConfig::from_env()?;
    let manager = DbManager::connect(&cfg.db).await?;
    let db = manager.client().clone();

    let service = AccessDecisionService::new(
        SurrealIdentityRepository::new(db.clone()),
        SurrealDeviceStateRepository::new(db.clone()),
        SurrealAuditLogRepository::new(db),
        cfg.access.clone(),
    );
    let router = app(
        Arc::new(service),
        cors_layer(cfg.allowed_origins.as_deref()),
    );

    let listener = TcpListener::bind(cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "canvass server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("canvass server stopped.");
    Ok(())
}
