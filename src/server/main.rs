use std::sync::Arc;

use todo_backend::adapters::HttpServer;
use todo_backend::config::Config;
use todo_backend::core::TodoService;
use todo_backend::storage::sqlite::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        db_path = %config.db_path().display(),
        port = config.port,
        "Starting todo backend"
    );

    let store = Arc::new(SqliteStore::open(&config.db_dir, config.sqlite()).await?);
    let todo_service = TodoService::new(store.clone());
    todo_service.initialize().await?;

    let http_server = HttpServer::new(todo_service, &config).await?;
    http_server.run(shutdown_signal()).await?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
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
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received, draining connections");
}
