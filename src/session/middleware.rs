use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, instrument, warn};

use super::{cookie::read_session_token, types::SessionIdentity};
use crate::shared::{AppError, AppState};

/// Session cookie middleware - verifies the signed `auth_token` cookie and adds
/// the decoded SessionIdentity to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::require_session))
/// Handlers can then extract Extension(identity): Extension<SessionIdentity>.
#[instrument(skip(state, req, next))]
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = read_session_token(req.headers(), &state.cookie_key)?;

    let claims = match state.session_service.issuer().verify_at(&token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Session authentication failed: {}", e);
            return Err(e);
        }
    };

    let identity = SessionIdentity::from(claims);
    info!(
        user_id = %identity.subject_id,
        "Authentication successful, adding identity to request"
    );

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
