use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AuthConfig, ConfigError};
use crate::session;
use crate::shared::AppState;

pub const USER_ROUTES: &str = "/api/v1/user";

/// All user/session routes, with the session guard on the protected ones
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route(USER_ROUTES, get(session::list_users))
        .route(
            &format!("{}/auth-status", USER_ROUTES),
            get(session::verify_session),
        )
        .route(
            &format!("{}/logout", USER_ROUTES),
            get(session::logout).delete(session::logout),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .route(&format!("{}/signup", USER_ROUTES), post(session::signup))
        .route(&format!("{}/login", USER_ROUTES), post(session::login))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Browser origins allowed to call the API with credentials
pub fn cors_layer(config: &AuthConfig) -> Result<CorsLayer, ConfigError> {
    Ok(CorsLayer::new()
        .allow_origin(config.cors_header_values()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
