use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Name of the cookie set by `POST /auth/login`.
pub const AUTH_COOKIE: &str = "access_token";

/// Authenticated user extracted from `Authorization: Bearer <token>` or the
/// `access_token` cookie.
///
/// Add this as a handler parameter to require authentication.
/// Permission checks happen via `require_permission()` in the handler body;
/// tenant scoping uses `school_id`.
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub school_id: i32,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    /// Returns true if the user has the given permission.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    /// Returns `Ok(())` if the user has the given permission, `Err(PermissionDenied)` otherwise.
    pub fn require_permission(&self, permission: &str) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    /// Returns `Ok(())` if the user has ANY of the given permissions.
    pub fn require_any_permission(&self, permissions: &[&str]) -> Result<(), AppError> {
        if permissions.iter().any(|perm| self.has_permission(perm)) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(header) = parts.headers.get("Authorization") else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| AppError::TokenInvalid)?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AppError::TokenInvalid)?;
    Ok(Some(token.to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The header wins over the cookie when both are present.
        let token = match bearer_token(parts)? {
            Some(token) => token,
            None => CookieJar::from_headers(&parts.headers)
                .get(AUTH_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or(AppError::TokenMissing)?,
        };

        let claims = jwt::verify(&token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.uid,
            username: claims.sub,
            school_id: claims.sid,
            role: claims.role,
            permissions: claims.permissions,
        })
    }
}
