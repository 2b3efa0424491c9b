//! Bearer-token sessions for volunteers and admins.
//!
//! Login handlers issue an HS256 token; [`middleware::require_auth`] verifies
//! it on protected routes and stores the resulting [`Session`] in the request
//! extensions, where handlers pick it up as an extractor.

pub mod jwt;
pub mod middleware;
pub mod password;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, NaiveDateTime, Utc};
use model::entities::admin::AdminRole;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult};
use jwt::{Expiring, TokenError, decode_hs256, encode_hs256};
use password::{PasswordError, random_bytes};

const RESET_PURPOSE: &str = "password_reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Volunteer,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl From<AdminRole> for Role {
    fn from(role: AdminRole) -> Self {
        match role {
            AdminRole::Admin => Role::Admin,
            AdminRole::SuperAdmin => Role::SuperAdmin,
        }
    }
}

/// Session token claims. `sub` is the volunteer ID for volunteers and the
/// numeric admin ID for admins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

impl Expiring for Claims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Password reset token claims. `sub` is the volunteer's row ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: i32,
    pub purpose: String,
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}

impl Expiring for ResetClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// The authenticated caller of a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
    pub role: Role,
    pub name: String,
}

impl Session {
    /// The volunteer ID of a volunteer session.
    pub fn volunteer_id(&self) -> ApiResult<&str> {
        match self.role {
            Role::Volunteer => Ok(&self.subject),
            _ => Err(ApiError::Forbidden("Volunteer session required".to_string())),
        }
    }

    /// The admin row ID of an admin session.
    pub fn admin_id(&self) -> ApiResult<i32> {
        if !self.role.is_admin() {
            return Err(ApiError::Forbidden("Admin session required".to_string()));
        }
        self.subject
            .parse()
            .map_err(|_| ApiError::Unauthorized("Invalid session subject".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(msg) => ApiError::Internal(msg),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

pub fn issue_session_token(config: &AppConfig, subject: &str, role: Role, name: &str) -> ApiResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role,
        name: name.to_string(),
        iat: now,
        exp: now + config.token_ttl_hours * 3600,
    };
    Ok(encode_hs256(config.jwt_secret.as_bytes(), &claims)?)
}

pub fn verify_session_token(config: &AppConfig, token: &str) -> ApiResult<Session> {
    let claims: Claims = decode_hs256(config.jwt_secret.as_bytes(), token, Utc::now().timestamp())?;
    Ok(Session {
        subject: claims.sub,
        role: claims.role,
        name: claims.name,
    })
}

/// Issue a reset token for the volunteer with row ID `volunteer_pk`.
/// Returns the token and the moment it stops being accepted.
pub fn issue_reset_token(config: &AppConfig, volunteer_pk: i32) -> ApiResult<(String, NaiveDateTime)> {
    let now = Utc::now();
    let expires = now + Duration::minutes(config.reset_token_ttl_minutes);
    let claims = ResetClaims {
        sub: volunteer_pk,
        purpose: RESET_PURPOSE.to_string(),
        nonce: hex::encode(random_bytes(8)?),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };
    let token = encode_hs256(config.jwt_secret.as_bytes(), &claims)?;
    Ok((token, expires.naive_utc()))
}

/// Verify a reset token and return the volunteer row ID it was issued for.
pub fn verify_reset_token(config: &AppConfig, token: &str) -> ApiResult<i32> {
    let claims: ResetClaims = decode_hs256(config.jwt_secret.as_bytes(), token, Utc::now().timestamp())?;
    if claims.purpose != RESET_PURPOSE {
        return Err(ApiError::Unauthorized("Invalid or expired reset token".to_string()));
    }
    Ok(claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            jwt_secret: "unit-test-secret".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_session_token_round_trip() {
        let config = config();
        let token = issue_session_token(&config, "BE2025001", Role::Volunteer, "Asha").unwrap();
        let session = verify_session_token(&config, &token).unwrap();

        assert_eq!(session.subject, "BE2025001");
        assert_eq!(session.role, Role::Volunteer);
        assert_eq!(session.volunteer_id().unwrap(), "BE2025001");
        assert!(session.admin_id().is_err());
    }

    #[test]
    fn test_admin_session_exposes_numeric_id() {
        let session = Session {
            subject: "7".to_string(),
            role: Role::SuperAdmin,
            name: "Root".to_string(),
        };
        assert_eq!(session.admin_id().unwrap(), 7);
        assert!(session.volunteer_id().is_err());
    }

    #[test]
    fn test_reset_token_is_not_a_session_token() {
        let config = config();
        let (token, _) = issue_reset_token(&config, 3).unwrap();
        assert_eq!(verify_reset_token(&config, &token).unwrap(), 3);
        assert!(verify_session_token(&config, &token).is_err());
    }

    #[test]
    fn test_reset_tokens_are_unique() {
        let config = config();
        let (a, _) = issue_reset_token(&config, 3).unwrap();
        let (b, _) = issue_reset_token(&config, 3).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_session_token_rejects_other_secret() {
        let token = issue_session_token(&config(), "1", Role::Admin, "A").unwrap();
        let other = AppConfig {
            jwt_secret: "another".to_string(),
            ..Default::default()
        };
        assert!(matches!(verify_session_token(&other, &token), Err(ApiError::Unauthorized(_))));
    }
}
