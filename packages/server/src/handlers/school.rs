use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{role, school, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppJson;
use crate::models::school::{
    CreateSchoolRequest, OnboardResponse, SchoolResponse, validate_create_school_request,
};
use crate::state::AppState;
use crate::utils::{hash, school::find_school};

/// Onboard a school and its first admin account.
#[utoipa::path(
    post,
    path = "/",
    tag = "Schools",
    operation_id = "createSchool",
    summary = "Onboard a school",
    description = "Creates a school (tenant) and its first user with the `admin` role. Public.",
    request_body = CreateSchoolRequest,
    responses(
        (status = 201, description = "School created", body = OnboardResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "School name or username taken (CONFLICT, USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(name = %payload.name))]
pub async fn create_school(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSchoolRequest>,
) -> Result<(StatusCode, Json<OnboardResponse>), AppError> {
    let name = validate_create_school_request(&payload)?;
    let password = hash::hash_password(&payload.admin_password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;
    let now = Utc::now();

    let txn = state.db.begin().await?;

    let school = school::ActiveModel {
        name: Set(name),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| crate::error::conflict_on_duplicate(e, "A school with this name already exists"))?;

    let admin = user::ActiveModel {
        username: Set(payload.admin_username.trim().to_string()),
        password: Set(password),
        role: Set(role::ADMIN_ROLE.to_string()),
        school_id: Set(school.id),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UsernameTaken,
        _ => AppError::from(e),
    })?;

    txn.commit().await?;

    info!(school_id = school.id, admin_id = admin.id, "School onboarded");

    Ok((
        StatusCode::CREATED,
        Json(OnboardResponse {
            school: school.into(),
            admin_user_id: admin.id,
            admin_username: admin.username,
        }),
    ))
}

/// Get the caller's school.
#[utoipa::path(
    get,
    path = "/current",
    tag = "Schools",
    operation_id = "getCurrentSchool",
    summary = "Caller's school",
    responses(
        (status = 200, description = "School", body = SchoolResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "School not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(school_id = auth_user.school_id))]
pub async fn current_school(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SchoolResponse>, AppError> {
    let school = find_school(&state.db, auth_user.school_id).await?;
    Ok(Json(school.into()))
}
