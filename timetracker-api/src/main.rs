//! # Timetracker API Server
//!
//! Loads configuration, connects PostgreSQL and (optionally) Redis, runs
//! migrations and serves the HTTP API until Ctrl-C or SIGTERM.
//!
//! ```bash
//! TIMETRACKER__DATABASE__URL=postgres://localhost/timetracker cargo run -p timetracker-api
//! ```

use std::sync::Arc;
use timetracker_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat, SessionBackend},
};
use timetracker_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
    },
    redis::{RedisClient, RedisConfig},
    repository::{
        postgres::PgRepository,
        redis::{RedisCache, RedisSessionRepository},
        CacheStorage, NoopCache, SessionRepository,
    },
    usecase::{Repositories, Usecases},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "timetracker_api=debug,timetracker_shared=debug,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(config.log.format);

    tracing::info!(
        "Timetracker API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    config.validate()?;

    let pool = create_pool(config.database.clone()).await?;
    run_migrations(&pool).await?;

    let mut session_redis = None;
    let sessions: Arc<dyn SessionRepository> = match config.session.backend {
        SessionBackend::Redis => {
            let client = RedisClient::new(RedisConfig::new(config.redis.session_url.clone())).await?;
            session_redis = Some(client.clone());
            Arc::new(RedisSessionRepository::new(client))
        }
        SessionBackend::Postgres => Arc::new(PgRepository::new(pool.clone())),
    };

    let mut cache_redis = None;
    let cache: Arc<dyn CacheStorage> = if config.cache.enabled {
        let client = RedisClient::new(RedisConfig::new(config.redis.cache_url.clone())).await?;
        cache_redis = Some(client.clone());
        Arc::new(RedisCache::new(client, config.cache.ttl))
    } else {
        tracing::info!("Project cache disabled");
        Arc::new(NoopCache)
    };

    let usecases = Usecases::new(
        Repositories::postgres(pool.clone(), sessions, cache),
        config.auth_settings(),
    );

    let address = config.bind_address();
    let mut state = AppState::new(usecases, config).with_db(pool.clone());
    if let Some(client) = session_redis {
        state = state.with_session_redis(client);
    }
    if let Some(client) = cache_redis {
        state = state.with_cache_redis(client);
    }

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
