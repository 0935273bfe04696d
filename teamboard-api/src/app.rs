/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                                   # Health check (public)
/// ├── /auth/
/// │   ├── POST /register                        # Public
/// │   └── POST /login                           # Public
/// ├── /teams/                                   # Bearer token required
/// │   ├── GET    /                              # My teams
/// │   ├── POST   /                              # Create team
/// │   ├── DELETE /:team_id                      # Delete team (lead)
/// │   ├── GET    /:team_id/members              # Roster (member)
/// │   ├── POST   /:team_id/members              # Add member (lead)
/// │   └── DELETE /:team_id/members/:member_id   # Remove member (lead)
/// ├── /projects/                                # Bearer token required
/// └── /workitems/                               # Bearer token required
/// ```
///
/// # Middleware Stack
///
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer, origins from configuration)
/// 3. Token validation (protected route groups only)

use crate::config::Config;
use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use teamboard_shared::auth::{jwt, middleware::AuthContext};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; the
/// configuration sits behind an Arc so cloning is cheap.
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

    /// Gets the token signing secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: health check and authentication.
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Everything below requires a valid bearer token.
    let team_routes = Router::new()
        .route("/", get(routes::teams::list_my_teams))
        .route("/", post(routes::teams::create_team))
        .route("/:team_id", delete(routes::teams::delete_team))
        .route("/:team_id/members", get(routes::teams::list_members))
        .route("/:team_id/members", post(routes::teams::add_member))
        .route(
            "/:team_id/members/:member_id",
            delete(routes::teams::remove_member),
        );

    let project_routes = Router::new()
        .route("/", get(routes::projects::list_my_projects))
        .route("/", post(routes::projects::create_project))
        .route("/:project_id", get(routes::projects::get_project))
        .route("/:project_id", put(routes::projects::update_project))
        .route("/:project_id", delete(routes::projects::delete_project));

    let work_item_routes = Router::new()
        .route("/", post(routes::work_items::create_work_item))
        .route(
            "/project/:project_id",
            get(routes::work_items::list_project_work_items),
        )
        .route("/:work_item_id", get(routes::work_items::get_work_item))
        .route("/:work_item_id", put(routes::work_items::update_work_item))
        .route(
            "/:work_item_id",
            delete(routes::work_items::delete_work_item),
        )
        .route(
            "/:work_item_id/attachments",
            post(routes::attachments::create_attachment),
        )
        .route(
            "/:work_item_id/attachments/:attachment_id",
            delete(routes::attachments::delete_attachment),
        );

    let protected_routes = Router::new()
        .nest("/teams", team_routes)
        .nest("/projects", project_routes)
        .nest("/workitems", work_item_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment.
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
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
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Token authentication middleware layer
///
/// Extracts and validates the bearer token from the Authorization header,
/// then injects an [`AuthContext`] into the request extensions.
async fn jwt_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            crate::error::ApiError::Unauthorized("Missing authorization header".to_string())
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        crate::error::ApiError::BadRequest("Expected Bearer token".to_string())
    })?;

    let claims = jwt::validate_token(token, state.jwt_secret())?;

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    Ok(next.run(req).await)
}
