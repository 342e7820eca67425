use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use internship_funnel::{
    config::{init_config, Config, LogFormat, StoreBackend},
    database::pool::{create_pool, run_migrations},
    error::Error,
    middleware::cors::permissive_cors,
    routes::build_router,
    store::{ApplicationStore, MemoryApplicationStore, PgApplicationStore},
    AppState,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn ApplicationStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| Error::Config("DATABASE_URL is not set".into()))?;
            let pool = create_pool(database_url).await?;
            run_migrations(&pool).await?;
            info!("Postgres store ready, migrations applied");
            Ok(Arc::new(PgApplicationStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; applications are lost on restart");
            Ok(Arc::new(MemoryApplicationStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = init_config()?;
    init_tracing(config.log_format);

    let store = build_store(config).await?;
    let app_state = AppState::from_config(config, store)?;

    if config.hireflix_webhook_secret.is_none() {
        warn!("HIREFLIX_WEBHOOK_SECRET not set; webhook calls are accepted unsigned");
    }

    tokio::fs::create_dir_all(&config.uploads_dir).await?;
    info!("Serving uploads from: {}", config.uploads_dir);

    let app = build_router(app_state, &config.uploads_dir)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
