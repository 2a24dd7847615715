use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{role, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppJson;
use crate::models::auth::{CreateUserRequest, UserResponse, validate_create_user_request};
use crate::state::AppState;
use crate::utils::hash;

/// Create a staff account in the caller's school.
#[utoipa::path(
    post,
    path = "/",
    tag = "Users",
    operation_id = "createUser",
    summary = "Create a user",
    description = "Creates a user in the caller's school with one of the seeded roles. Requires `user:manage`.",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(username = %payload.username))]
pub async fn create_user(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    auth_user.require_permission("user:manage")?;
    validate_create_user_request(&payload)?;

    let role_name = payload.role.trim();
    if role::Entity::find_by_id(role_name.to_string())
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(format!("Unknown role '{role_name}'")));
    }

    let password = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let user = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        password: Set(password),
        role: Set(role_name.to_string()),
        school_id: Set(auth_user.school_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UsernameTaken,
        _ => AppError::from(e),
    })?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List the users of the caller's school.
#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users",
    responses(
        (status = 200, description = "Users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    auth_user.require_permission("user:manage")?;

    let users = user::Entity::find()
        .filter(user::Column::SchoolId.eq(auth_user.school_id))
        .order_by_asc(user::Column::Username)
        .all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}
