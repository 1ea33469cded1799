/// Application state and router builder
///
/// Defines the shared application state and builds the Axum router with all
/// routes and middleware.
///
/// # Example
///
/// ```no_run
/// use crewcall_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = crewcall_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```
use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use crewcall_shared::auth::middleware::authenticate;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor. Uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
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
/// ├── /health                          # Liveness + DB connectivity (public)
/// └── /v1/
///     ├── /auth/                       # register, login, refresh (public)
///     │                                # me, logout (authenticated)
///     ├── /events/                     # upcoming (public); the rest authenticated
///     ├── /shifts/                     # authenticated
///     └── /users/                      # authenticated
/// ```
///
/// Role checks (management tier, admin) happen inside handlers via the
/// authorization helpers, after the JWT middleware has established identity.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (per-route-group)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    // Authenticated auth routes
    let auth_private = Router::new()
        .route("/me", get(routes::auth::me))
        .route("/logout", post(routes::auth::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let auth_routes = auth_public.merge(auth_private);

    // Public event listings for the landing page
    let events_public = Router::new()
        .route("/upcoming", get(routes::events::upcoming_events));

    let events_private = Router::new()
        .route("/", get(routes::events::list_events))
        .route("/", post(routes::events::create_event))
        .route("/past", get(routes::events::past_events))
        .route("/:id", get(routes::events::get_event))
        .route("/:id", patch(routes::events::update_event))
        .route("/:id", delete(routes::events::delete_event))
        .route("/:id/stats", get(routes::events::event_stats))
        .route("/:id/status", patch(routes::events::set_event_status))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let event_routes = events_public.merge(events_private);

    // Static paths like /my-shifts take precedence over /:id
    let shift_routes = Router::new()
        .route("/", get(routes::shifts::list_shifts))
        .route("/", post(routes::shifts::create_shift))
        .route("/my-shifts", get(routes::shifts::my_shifts))
        .route("/my-applications", get(routes::shifts::my_applications))
        .route("/available", get(routes::shifts::available_shifts))
        .route("/stats", get(routes::shifts::shift_stats))
        .route(
            "/applications/pending",
            get(routes::shifts::pending_applications),
        )
        .route(
            "/applications/:id/review",
            post(routes::shifts::review_application),
        )
        .route(
            "/applications/:id",
            delete(routes::shifts::cancel_application),
        )
        .route("/:id", get(routes::shifts::get_shift))
        .route("/:id", patch(routes::shifts::update_shift))
        .route("/:id", delete(routes::shifts::delete_shift))
        .route("/:id/applications", get(routes::shifts::shift_applications))
        .route("/:id/apply", post(routes::shifts::apply_to_shift))
        .route("/:id/assign", post(routes::shifts::assign_shift))
        .route("/:id/unassign", post(routes::shifts::unassign_shift))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/:id", get(routes::users::get_user))
        .route("/:id", patch(routes::users::update_user))
        .route("/:id/roles", put(routes::users::replace_roles))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/events", event_routes)
        .nest("/shifts", shift_routes)
        .nest("/users", user_routes);

    // CORS: permissive unless explicit origins are configured
    let cors = if state.config.api.cors_origins.is_empty() {
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
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// JWT authentication middleware layer
///
/// Validates the Bearer token from the Authorization header and injects an
/// `AuthContext` into request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret())?;
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
