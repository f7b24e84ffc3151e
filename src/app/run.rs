use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::{
    app::{
        self,
        config::{AppConfig, LogSettings, OtelSettings, StorageBackend},
        router::RouterOptions,
    },
    error::AppError,
    repositories::Store,
    telemetry,
};

pub async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();
    telemetry::init_tracing(&LogSettings::from_env(), OtelSettings::from_env().as_ref())
        .map_err(|err| AppError::Internal(format!("telemetry init failed: {}", err)))?;

    let config = AppConfig::from_env()?;
    let store = match &config.storage {
        StorageBackend::Postgres(settings) => {
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .min_connections(settings.min_connections)
                .acquire_timeout(settings.acquire_timeout)
                .connect(&settings.url)
                .await
                .map_err(AppError::Database)?;
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Using postgres storage");
            Store::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Store::memory()
        }
    };

    let state = app::state::AppState::new(store, config.jwt.clone());
    let app = app::router::build_router(
        state,
        RouterOptions {
            cors_origin: config.cors_origin.clone(),
            rate_limit: config.rate_limit,
        },
    )?;

    tracing::info!(addr = %config.addr, rate_limited = config.rate_limit.is_some(), "Server listening");
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|err| AppError::Internal(format!("bind failed: {}", err)))?;
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|err| AppError::Internal(format!("server error: {}", err)));
    telemetry::shutdown_tracing();
    result?;
    Ok(())
}
