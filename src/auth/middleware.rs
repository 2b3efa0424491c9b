use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use super::{Role, Session, verify_session_token};
use crate::error::ApiError;
use crate::schemas::AppState;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Verify the bearer token and attach the caller's [`Session`] to the request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let session = match bearer_token(&request) {
        Some(token) => verify_session_token(&state.config, token)?,
        None => {
            warn!(path = %request.uri().path(), "Request without bearer token");
            return Err(ApiError::Unauthorized("Missing bearer token".to_string()));
        }
    };

    debug!(subject = %session.subject, role = ?session.role, "Authenticated request");
    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

fn session_of(request: &Request) -> Result<&Session, ApiError> {
    request
        .extensions()
        .get::<Session>()
        .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
}

/// Only volunteer sessions may pass. Must run after [`require_auth`].
pub async fn require_volunteer(request: Request, next: Next) -> Result<Response, ApiError> {
    if session_of(&request)?.role != Role::Volunteer {
        return Err(ApiError::Forbidden("Volunteer session required".to_string()));
    }
    Ok(next.run(request).await)
}

/// Only admin and super admin sessions may pass. Must run after [`require_auth`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    if !session_of(&request)?.role.is_admin() {
        return Err(ApiError::Forbidden("Admin session required".to_string()));
    }
    Ok(next.run(request).await)
}
