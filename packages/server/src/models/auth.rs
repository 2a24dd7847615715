use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Validate a username (1-32 chars, letters, digits and underscores).
pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Username of the account to log into.
    #[schema(example = "principal_ade")]
    pub username: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful login response. The token is also set as the `access_token` cookie.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "principal_ade")]
    pub username: String,
    #[schema(example = 1)]
    pub school_id: i32,
    #[schema(example = "principal")]
    pub role: String,
    #[schema(example = json!(["result:approve"]))]
    pub permissions: Vec<String>,
}

/// Current authenticated user's profile.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "principal_ade")]
    pub username: String,
    #[schema(example = 1)]
    pub school_id: i32,
    #[schema(example = "principal")]
    pub role: String,
    #[schema(example = json!(["result:approve"]))]
    pub permissions: Vec<String>,
}

/// Request body for creating a staff account in the caller's school.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "teacher_bola")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// One of the seeded roles: `admin`, `principal`, `teacher`.
    #[schema(example = "teacher")]
    pub role: String,
}

pub fn validate_create_user_request(payload: &CreateUserRequest) -> Result<(), AppError> {
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;
    if payload.role.trim().is_empty() {
        return Err(AppError::Validation("Role must not be empty".into()));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "teacher_bola")]
    pub username: String,
    #[schema(example = "teacher")]
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            created_at: user.created_at,
        }
    }
}
