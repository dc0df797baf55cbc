/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use timetracker_api::{app::{build_router, AppState}, config::Config};
/// use timetracker_shared::{
///     repository::memory::MemoryRepository,
///     usecase::{AuthSettings, Repositories, Usecases},
/// };
///
/// # async fn example() -> anyhow::Result<()> {
/// let repos = Repositories::memory(Arc::new(MemoryRepository::default()));
/// let state = AppState::new(Usecases::new(repos, AuthSettings::default()), Config::default());
///
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, build_router(state)).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::{
        acl::{admin_only, friends_or_admin},
        security::security_headers,
        session::require_session,
    },
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state, map_response_with_state},
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use timetracker_shared::{redis::RedisClient, usecase::Usecases};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub usecases: Arc<Usecases>,

    pub config: Arc<Config>,

    /// Database pool, kept for health reporting
    pub db: Option<PgPool>,

    /// Redis clients, kept for health reporting
    pub session_redis: Option<RedisClient>,
    pub cache_redis: Option<RedisClient>,
}

impl AppState {
    pub fn new(usecases: Usecases, config: Config) -> Self {
        Self {
            usecases: Arc::new(usecases),
            config: Arc::new(config),
            db: None,
            session_redis: None,
            cache_redis: None,
        }
    }

    pub fn with_db(mut self, db: PgPool) -> Self {
        self.db = Some(db);
        self
    }

    pub fn with_session_redis(mut self, client: RedisClient) -> Self {
        self.session_redis = Some(client);
        self
    }

    pub fn with_cache_redis(mut self, client: RedisClient) -> Self {
        self.cache_redis = Some(client);
        self
    }
}

/// Builds the router with all routes and middleware
///
/// ```text
/// /health, /signup, /signin, /auth         public
/// /user/:user_id/{entries,goals,projects,
///                 tags,friends}            session + friends or admin
/// /users, /user/:user_id/subs              session + admin
/// everything else                          session
/// ```
///
/// Layers, outermost last: tracing, CORS, security headers.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::sign_up))
        .route("/signin", post(routes::auth::sign_in))
        .route("/auth", get(routes::auth::auth));

    let friends_gated = Router::new()
        .route("/user/:user_id/entries", get(routes::entries::user_entries))
        .route("/user/:user_id/goals", get(routes::goals::user_goals))
        .route("/user/:user_id/projects", get(routes::projects::user_projects))
        .route("/user/:user_id/tags", get(routes::tags::user_tags))
        .route("/user/:user_id/friends", get(routes::friends::user_friends))
        .route_layer(from_fn_with_state(state.clone(), friends_or_admin));

    let admin_gated = Router::new()
        .route("/users", get(routes::users::list_users))
        .route("/user/:user_id/subs", get(routes::friends::user_subs))
        .route_layer(from_fn(admin_only));

    let private_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::users::me))
        .route("/me/edit", put(routes::users::edit_me))
        .route("/users/:user_id", get(routes::users::get_user))
        // friends
        .route("/friends/subscribe/:user_id", post(routes::friends::subscribe))
        .route(
            "/friends/unsubscribe/:user_id",
            axum::routing::delete(routes::friends::unsubscribe),
        )
        .route("/me/friends", get(routes::friends::my_friends))
        .route("/me/subs", get(routes::friends::my_subs))
        // entries
        .route("/entry/create", post(routes::entries::create_entry))
        .route("/entry/edit", post(routes::entries::edit_entry))
        .route(
            "/entry/:id",
            get(routes::entries::get_entry).delete(routes::entries::delete_entry),
        )
        .route("/me/entries", get(routes::entries::my_entries))
        // goals
        .route("/goal/create", post(routes::goals::create_goal))
        .route("/goal/edit", post(routes::goals::edit_goal))
        .route(
            "/goal/:id",
            get(routes::goals::get_goal).delete(routes::goals::delete_goal),
        )
        .route("/me/goals", get(routes::goals::my_goals))
        // projects
        .route("/project/create", post(routes::projects::create_project))
        .route("/project/edit", post(routes::projects::edit_project))
        .route(
            "/project/:id",
            get(routes::projects::get_project).delete(routes::projects::delete_project),
        )
        .route("/me/projects", get(routes::projects::my_projects))
        // tags
        .route("/tag/create", post(routes::tags::create_tag))
        .route("/tag/edit", post(routes::tags::edit_tag))
        .route(
            "/tag/:id",
            get(routes::tags::get_tag).delete(routes::tags::delete_tag),
        )
        .route("/me/tags", get(routes::tags::my_tags))
        .merge(friends_gated)
        .merge(admin_gated)
        .route_layer(from_fn_with_state(state.clone(), require_session));

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(public_routes)
        .merge(private_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(map_response_with_state(production, security_headers))
        .with_state(state)
}
