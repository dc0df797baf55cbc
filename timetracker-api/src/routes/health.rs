/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "session_store": "connected",
///   "cache": "disabled"
/// }
/// ```
///
/// A backend the process was started without reports `"disabled"`; any
/// backend reporting `"disconnected"` degrades the status.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use timetracker_shared::{db::pool, redis::RedisClient};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub session_store: String,
    pub cache: String,
}

const CONNECTED: &str = "connected";
const DISCONNECTED: &str = "disconnected";
const DISABLED: &str = "disabled";

async fn redis_status(client: Option<&RedisClient>) -> &'static str {
    match client {
        None => DISABLED,
        Some(client) => match client.ping().await {
            Ok(true) => CONNECTED,
            _ => DISCONNECTED,
        },
    }
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.db {
        None => DISABLED,
        Some(db) => match pool::health_check(db).await {
            Ok(()) => CONNECTED,
            Err(e) => {
                tracing::warn!(error = %e, "database health check failed");
                DISCONNECTED
            }
        },
    };

    let (session_store, cache) = tokio::join!(
        redis_status(state.session_redis.as_ref()),
        redis_status(state.cache_redis.as_ref()),
    );

    let degraded = [database, session_store, cache].contains(&DISCONNECTED);

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        session_store: session_store.to_string(),
        cache: cache.to_string(),
    })
}
