/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use taskhub_api::{app::AppState, config::Config};
/// use taskhub_shared::email::{Mailer, MailerConfig};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let mailer = Mailer::new(MailerConfig {
///     smtp_url: config.smtp.url.clone(),
///     from: config.smtp.from.clone(),
/// })?;
/// let state = AppState::new(pool, config, mailer);
/// let app = taskhub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskhub_shared::auth::middleware::{session_auth_middleware, AuthError};
use taskhub_shared::email::Mailer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. This is
/// the injected store capability: handlers hold no global state, and the
/// pool is the system's only serialization point.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Welcome/farewell notification sender
    pub mailer: Mailer,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Mailer) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
        }
    }

    /// Gets the session-token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                  # Health check (public)
/// ├── POST /users                   # Signup (public)
/// ├── POST /users/login             # Login (public)
/// ├── GET  /users/:id/avatar        # Avatar fetch (public)
/// ├── POST /users/logout            # Revoke current session
/// ├── POST /users/logoutall         # Revoke all sessions
/// ├── GET/PATCH/DELETE /users/me    # Profile
/// ├── POST/DELETE /users/me/avatar  # Avatar upload / delete
/// ├── POST/GET /tasks               # Create / list
/// └── GET/PATCH/DELETE /tasks/:id   # Single task
/// ```
///
/// Everything below the public block runs behind the session auth layer.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: no auth
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/users", post(routes::users::signup))
        .route("/users/login", post(routes::users::login))
        .route("/users/:id/avatar", get(routes::users::get_avatar));

    // Profile and session routes (auth required)
    let user_routes = Router::new()
        .route("/users/logout", post(routes::users::logout))
        .route("/users/logoutall", post(routes::users::logout_all))
        .route(
            "/users/me",
            get(routes::users::get_profile)
                .patch(routes::users::update_profile)
                .delete(routes::users::delete_profile),
        )
        .route(
            "/users/me/avatar",
            post(routes::users::upload_avatar)
                .delete(routes::users::delete_avatar)
                // Generous transport bound: the handler enforces the real
                // avatar ceiling itself, so an oversized upload gets the
                // route's 400 instead of a framework rejection
                .layer(DefaultBodyLimit::max(4 * routes::users::AVATAR_MAX_BYTES)),
        );

    // Task routes (auth required, all owner-scoped)
    let task_routes = Router::new()
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        );

    let protected_routes = Router::new()
        .merge(user_routes)
        .merge(task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Resolves the bearer token to a live user session and injects
/// `AuthSession` into request extensions for downstream handlers.
async fn session_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    session_auth_middleware(
        state.db.clone(),
        state.config.jwt.secret.clone(),
        req,
        next,
    )
    .await
}
