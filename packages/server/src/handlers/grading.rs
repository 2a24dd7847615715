use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{grade_band, grading_system, grading_system_class, school_class};
use crate::error::{AppError, ErrorBody, conflict_on_duplicate};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::grading::*;
use crate::models::shared::validate_bulk_ids;
use crate::results::service::load_grade_scale;
use crate::state::AppState;
use crate::utils::school::{find_class, find_grading_system};

const MANAGE: &str = "grading:manage";

async fn system_detail<C: ConnectionTrait>(
    db: &C,
    system: grading_system::Model,
) -> Result<GradingSystemResponse, DbErr> {
    let bands = grade_band::Entity::find()
        .filter(grade_band::Column::GradingSystemId.eq(system.id))
        .order_by_desc(grade_band::Column::ScoreStartPoint)
        .all(db)
        .await?;
    let class_ids = grading_system_class::Entity::find()
        .filter(grading_system_class::Column::GradingSystemId.eq(system.id))
        .order_by_asc(grading_system_class::Column::ClassId)
        .all(db)
        .await?
        .into_iter()
        .map(|gc| gc.class_id)
        .collect();

    Ok(GradingSystemResponse {
        system: system.into(),
        bands: bands.into_iter().map(Into::into).collect(),
        class_ids,
    })
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Grading Systems",
    operation_id = "createGradingSystem",
    summary = "Create a grading system",
    description = "Creates a named set of non-overlapping grade bands. Requires `grading:manage`.",
    request_body = CreateGradingSystemRequest,
    responses(
        (status = 201, description = "Grading system created", body = GradingSystemResponse),
        (status = 400, description = "Invalid or overlapping bands (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Duplicate name (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_grading_system(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateGradingSystemRequest>,
) -> Result<(StatusCode, Json<GradingSystemResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    let (name, bands) = validate_create_grading_system_request(&payload)?;

    let txn = state.db.begin().await?;

    let system = grading_system::ActiveModel {
        school_id: Set(auth_user.school_id),
        name: Set(name),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| conflict_on_duplicate(e, "A grading system with this name already exists"))?;

    grade_band::Entity::insert_many(bands.into_iter().map(|b| grade_band::ActiveModel {
        grading_system_id: Set(system.id),
        grade: Set(b.grade),
        score_start_point: Set(b.score_start_point),
        score_end_point: Set(b.score_end_point),
        remark: Set(b.remark),
        ..Default::default()
    }))
    .exec_without_returning(&txn)
    .await?;

    let detail = system_detail(&txn, system).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Grading Systems",
    operation_id = "listGradingSystems",
    summary = "List grading systems",
    responses((status = 200, description = "Grading systems", body = Vec<GradingSystemSummary>)),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_grading_systems(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<GradingSystemSummary>>, AppError> {
    auth_user.require_permission(MANAGE)?;

    let systems = grading_system::Entity::find()
        .filter(grading_system::Column::SchoolId.eq(auth_user.school_id))
        .order_by_asc(grading_system::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(systems.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Grading Systems",
    operation_id = "getGradingSystem",
    summary = "Get a grading system with its bands",
    params(("id" = i32, Path, description = "Grading system ID")),
    responses(
        (status = 200, description = "Grading system", body = GradingSystemResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_grading_system(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<GradingSystemResponse>, AppError> {
    auth_user.require_permission(MANAGE)?;

    let system = find_grading_system(&state.db, auth_user.school_id, id).await?;
    Ok(Json(system_detail(&state.db, system).await?))
}

#[utoipa::path(
    put,
    path = "/{id}/classes",
    tag = "Grading Systems",
    operation_id = "assignGradingSystem",
    summary = "Assign a grading system to classes",
    description = "Each class uses at most one grading system; listed classes are moved to this one.",
    params(("id" = i32, Path, description = "Grading system ID")),
    request_body = AssignGradingSystemRequest,
    responses(
        (status = 200, description = "Grading system", body = GradingSystemResponse),
        (status = 400, description = "Unknown class (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn assign_grading_system(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AssignGradingSystemRequest>,
) -> Result<Json<GradingSystemResponse>, AppError> {
    auth_user.require_permission(MANAGE)?;
    validate_bulk_ids(&payload.class_ids, "class_ids", 200)?;

    let txn = state.db.begin().await?;
    let system = find_grading_system(&txn, auth_user.school_id, id).await?;

    let found = school_class::Entity::find()
        .filter(school_class::Column::SchoolId.eq(auth_user.school_id))
        .filter(school_class::Column::Id.is_in(payload.class_ids.clone()))
        .count(&txn)
        .await?;
    if found as usize != payload.class_ids.len() {
        return Err(AppError::Validation(
            "One or more classes do not exist in this school".into(),
        ));
    }

    grading_system_class::Entity::insert_many(payload.class_ids.iter().map(|&class_id| {
        grading_system_class::ActiveModel {
            class_id: Set(class_id),
            grading_system_id: Set(system.id),
        }
    }))
    .on_conflict(
        OnConflict::column(grading_system_class::Column::ClassId)
            .update_column(grading_system_class::Column::GradingSystemId)
            .to_owned(),
    )
    .exec_without_returning(&txn)
    .await?;

    let detail = system_detail(&txn, system).await?;
    txn.commit().await?;

    info!(grading_system_id = id, classes = payload.class_ids.len(), "Grading system assigned");
    Ok(Json(detail))
}

/// Resolve the grade a score earns in a class.
#[utoipa::path(
    get,
    path = "/resolve",
    tag = "Grading Systems",
    operation_id = "resolveGrade",
    summary = "Resolve a grade",
    description = "Returns the band of the class's grading system containing `score` (both ends inclusive), or `null`. Requires `score:view`.",
    params(ResolveGradeParams),
    responses(
        (status = 200, description = "Resolved grade", body = ResolveGradeResponse),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, params))]
pub async fn resolve_grade(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ResolveGradeParams>,
) -> Result<Json<ResolveGradeResponse>, AppError> {
    auth_user.require_permission("score:view")?;
    let class = find_class(&state.db, auth_user.school_id, params.class_id).await?;

    let scale = load_grade_scale(&state.db, class.id).await?;
    let grade = scale.resolve(params.score).cloned().map(Into::into);

    Ok(Json(ResolveGradeResponse {
        score: params.score,
        grade,
    }))
}
