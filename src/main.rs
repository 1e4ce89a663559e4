use discounts_app::notify::LogNotifier;
use discounts_app::{router, AppState, Config, FileStore, RecordStore};
use std::sync::Arc;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    let backend = FileStore::new(config.data_dir.clone());
    let data_dir = backend.dir().display().to_string();
    let store = RecordStore::new(Arc::new(backend));
    info!(
        records = store.load().len(),
        %data_dir,
        "loaded discounts"
    );

    let app = router(AppState::new(store, Arc::new(LogNotifier)));

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {err}");
    }
    info!("shutting down");
}
