use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use metarev_core::{ActionToken, MetarevConfig};
use metarev_metadata::{create_sqlite_pool, run_migrations, SqliteConfigStore, SqliteMetadataStore};
use metarev_rest::{router, tracing_init, AppState};
use rand::distributions::Alphanumeric;
use rand::Rng;

#[derive(Parser)]
#[command(name = "metarev-rest", version, about = "Revision metadata sync server")]
struct Args {
    /// Configuration file; replaces the default search path
    #[arg(short, long, env = "METAREV_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MetarevConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => MetarevConfig::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            MetarevConfig::default()
        }),
    };
    config.validate()?;

    tracing_init::init_logging(&config.logging)?;

    tracing::info!(url = %config.database.url, "connecting to metadata database");
    let pool = create_sqlite_pool(&config.database.url, config.database.max_connections).await?;
    run_migrations(&pool).await?;

    let secret = if config.admin.token_secret.is_empty() {
        tracing::warn!("admin.token_secret is empty; generated a random secret, tokens will not survive a restart");
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect()
    } else {
        config.admin.token_secret.clone()
    };

    let state = Arc::new(AppState::new(
        Arc::new(SqliteMetadataStore::new(pool.clone())),
        Arc::new(SqliteConfigStore::new(pool.clone())),
        config.registry.clone(),
        config.admin.clone(),
        ActionToken::new(secret),
    ));
    tracing::info!(
        mandatory_keys = config.registry.mandatory_keys.len(),
        "revision metadata engine configured"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("REST server listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("server shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
