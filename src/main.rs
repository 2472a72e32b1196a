use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use clinicbook::config::AppConfig;
use clinicbook::db;
use clinicbook::handlers;
use clinicbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.webhook_secret.is_empty() {
        tracing::warn!("WEBHOOK_SECRET not set, fulfillment signatures are not checked");
    }

    let conn = db::init_db(&config.database_url)?;
    let state = Arc::new(AppState::new(conn, config.clone()));

    let app = handlers::router(state).layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
