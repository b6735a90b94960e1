use axum::{extract::State, http::StatusCode, Extension, Json};
use axum_extra::extract::cookie::SignedCookieJar;
use tracing::{info, instrument};
use validator::{Validate, ValidationErrors};

use super::{
    cookie::{removal_cookie, session_cookie},
    types::{
        EstablishedSession, LoginRequest, SessionIdentity, SessionResponse, SignupRequest,
        UserListResponse,
    },
};
use crate::shared::{AppError, AppState};

type CookieResponse = (StatusCode, SignedCookieJar, Json<SessionResponse>);

/// HTTP handler for account creation
///
/// POST /api/v1/user/signup
/// Creates the user and sets the session cookie
#[instrument(name = "signup", skip(state, jar, request))]
pub async fn signup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<SignupRequest>,
) -> Result<CookieResponse, AppError> {
    request.validate().map_err(validation_error)?;

    let session = state.session_service.signup(request).await?;
    let jar = attach_session(jar, &session)?;

    info!(email = %session.profile.email, "User created");
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse::new("User created successfully", session.profile)),
    ))
}

/// HTTP handler for password login
///
/// POST /api/v1/user/login
/// Reissues the session cookie on success; sets nothing on failure
#[instrument(name = "login", skip(state, jar, request))]
pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<CookieResponse, AppError> {
    request.validate().map_err(validation_error)?;

    let session = state.session_service.login(request).await?;
    let jar = attach_session(jar, &session)?;

    Ok((
        StatusCode::OK,
        jar,
        Json(SessionResponse::new("Login successful", session.profile)),
    ))
}

/// GET /api/v1/user/auth-status (behind require_session)
#[instrument(name = "verify_session", skip_all)]
pub async fn verify_session(
    State(state): State<AppState>,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<Json<SessionResponse>, AppError> {
    let profile = state.session_service.verify_session(&identity).await?;

    Ok(Json(SessionResponse::new("User verified", profile)))
}

/// GET|DELETE /api/v1/user/logout (behind require_session)
#[instrument(name = "logout", skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Extension(identity): Extension<SessionIdentity>,
) -> Result<CookieResponse, AppError> {
    let profile = state.session_service.logout(&identity).await?;
    let jar = jar.remove(removal_cookie());

    info!(user_id = %identity.subject_id, "Session cookie cleared");
    Ok((
        StatusCode::OK,
        jar,
        Json(SessionResponse::new("User logged out successfully", profile)),
    ))
}

/// GET /api/v1/user (behind require_session)
#[instrument(name = "list_users", skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_identity): Extension<SessionIdentity>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state.session_service.list_users().await?;

    Ok(Json(UserListResponse {
        message: "OK".to_string(),
        users,
    }))
}

fn attach_session(
    jar: SignedCookieJar,
    session: &EstablishedSession,
) -> Result<SignedCookieJar, AppError> {
    let cookie = session_cookie(session.token.token.clone(), session.token.claims.exp)?;
    Ok(jar.add(cookie))
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| match &err.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();

    AppError::Validation(messages.join(", "))
}
