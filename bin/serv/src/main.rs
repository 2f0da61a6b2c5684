use std::net::SocketAddr;

use axum::{Router, middleware, routing::get};
use mth_api::{
    ApiConfig, ApiState,
    metrics::{init_metrics, metrics_handler, track_metrics},
    middleware::{ReviewThrottle, create_cors_layer, request_id_middleware},
    router,
    tracing::{init_tracing, log_scheduler_config},
};
use mth_db::{MemoryStore, PgStore, SrsStore};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    init_tracing(config.env);
    log_scheduler_config(&config.srs_params, &config.session_limits);
    let metrics = init_metrics()?;

    match config.database_url.clone() {
        Some(database_url) => {
            let pool = mth_db::create_pool(&database_url, config.db_max_connections).await?;
            mth_db::ensure_db_and_migrate(&database_url, &pool).await?;
            serve(&config, PgStore::new(pool, config.srs_params), metrics).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set, cards are kept in memory only");
            serve(&config, MemoryStore::new(config.srs_params), metrics).await
        }
    }
}

async fn serve<S: SrsStore>(
    config: &ApiConfig,
    store: S,
    metrics: mth_api::metrics::PrometheusHandle,
) -> anyhow::Result<()> {
    let state = ApiState::new(config, store);

    let metrics_routes = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics);

    let app = router::router(ReviewThrottle::from_config(config))
        .with_state(state)
        .merge(metrics_routes)
        .layer(middleware::from_fn(track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(create_cors_layer(config.parsed_allowed_origins()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = ?config.env, "Server listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
