mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = quill_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = quill_db::PoolConfig::from_app_config(&config);
    let pool = quill_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = quill_db::run_migrations(&pool).await?;
    tracing::info!(applied, "migrations complete");

    let pipeline = Arc::new(quill_pipeline::Pipeline::from_app_config(pool.clone(), &config)?);

    let _scheduler = if config.scheduler_enabled {
        Some(scheduler::build_scheduler(Arc::clone(&pipeline), &config).await?)
    } else {
        tracing::info!("scheduler: disabled by QUILL_SCHEDULER_ENABLED");
        None
    };

    let auth = AuthState::from_secret(
        config.cron_secret.as_deref(),
        matches!(config.env, quill_core::Environment::Development),
    )?;
    let app = build_app(AppState { pool, pipeline }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, write_mode = %config.write_mode, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
