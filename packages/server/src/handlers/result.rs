use axum::{
    Json,
    extract::{Path, State},
};
use sea_orm::*;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::marking_scheme::parse_scope;
use crate::models::result::*;
use crate::models::shared::{PageParams, Pagination};
use crate::results::{BatchFilter, BatchTarget, ComputeOutcome, ResultService, result_service};
use crate::state::AppState;
use crate::utils::school::{find_arm_of_class, find_session_term};

const VIEW: &str = "result:view";

/// Compute the result batch of a class arm.
#[utoipa::path(
    post,
    path = "/submit",
    tag = "Results",
    operation_id = "submitResult",
    summary = "Compute a result batch",
    description = "Aggregates every student's scores for every subject the class offers, resolves grades, ranks per subject and stores the batch. Recomputing the same class arm, term and scope updates the existing batch in place. Requires `result:compute`.",
    request_body = SubmitResultRequest,
    responses(
        (status = 200, description = "Batch computed", body = ComputeOutcome),
        (status = 400, description = "Bad scope, missing result type or incomplete scores (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entity or marking scheme not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Batch already approved (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(class_arm_id = payload.class_arm_id, scope = %payload.scope))]
pub async fn submit_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SubmitResultRequest>,
) -> Result<Json<ComputeOutcome>, AppError> {
    auth_user.require_permission("result:compute")?;
    let scope = parse_scope(&payload.scope)?;

    let school_id = auth_user.school_id;
    let txn = state.db.begin().await?;

    let (session, term) =
        find_session_term(&txn, school_id, payload.session_id, payload.term_id).await?;
    let (class, arm) =
        find_arm_of_class(&txn, school_id, payload.class_id, payload.class_arm_id).await?;

    let target = BatchTarget {
        school_id,
        session,
        term,
        class,
        arm,
        scope,
        result_type_id: payload.result_type_id,
    };

    let outcome = ResultService::new(&txn, &state.config.results)
        .compute(&target, auth_user.user_id)
        .await?;
    txn.commit().await?;

    Ok(Json(outcome))
}

/// Approve a computed batch.
#[utoipa::path(
    post,
    path = "/approve",
    tag = "Results",
    operation_id = "approveResult",
    summary = "Approve a result batch",
    description = "Freezes the batch. There is no way back: approving again, or recomputing afterwards, is a conflict. Requires `result:approve`.",
    request_body = ApproveResultRequest,
    responses(
        (status = 200, description = "Batch approved", body = ResultBatchResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Batch not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already approved (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(batch_id = payload.result_batch_id))]
pub async fn approve_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<ApproveResultRequest>,
) -> Result<Json<ResultBatchResponse>, AppError> {
    auth_user.require_permission("result:approve")?;

    let txn = state.db.begin().await?;
    let batch = ResultService::new(&txn, &state.config.results)
        .approve(auth_user.school_id, payload.result_batch_id, auth_user.user_id)
        .await?;
    txn.commit().await?;

    Ok(Json(batch.into()))
}

#[utoipa::path(
    get,
    path = "/batches",
    tag = "Results",
    operation_id = "listResultBatches",
    summary = "List result batches",
    description = "Newest first. Optional filters narrow by session, term or class.",
    params(BatchListParams),
    responses(
        (status = 200, description = "Batches", body = BatchListResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, params))]
pub async fn list_batches(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<BatchListParams>,
) -> Result<Json<BatchListResponse>, AppError> {
    auth_user.require_permission(VIEW)?;

    let (page, per_page) = PageParams {
        page: params.page,
        per_page: params.per_page,
    }
    .resolve();
    let filter = BatchFilter {
        session_id: params.session_id,
        term_id: params.term_id,
        class_id: params.class_id,
    };

    let (batches, total) = result_service(&state.db, &state.config.results)
        .list_batches(auth_user.school_id, filter, page, per_page)
        .await?;

    Ok(Json(BatchListResponse {
        data: batches.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Broadsheet: a batch with every student-subject row.
#[utoipa::path(
    get,
    path = "/batches/{id}",
    tag = "Results",
    operation_id = "getResultBatch",
    summary = "Get a broadsheet",
    params(("id" = i32, Path, description = "Result batch ID")),
    responses(
        (status = 200, description = "Broadsheet", body = BroadsheetResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Batch not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_batch(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BroadsheetResponse>, AppError> {
    auth_user.require_permission(VIEW)?;

    let service = result_service(&state.db, &state.config.results);
    let batch = service.get_batch(auth_user.school_id, id).await?;
    let rows = service.batch_results(batch.id).await?;

    Ok(Json(BroadsheetResponse {
        marking_scheme_structure: batch.marking_scheme_structure.clone(),
        batch: batch.into(),
        results: rows.into_iter().map(Into::into).collect(),
    }))
}

/// Report card of one student within a batch.
#[utoipa::path(
    get,
    path = "/batches/{id}/students/{student_id}",
    tag = "Results",
    operation_id = "getStudentReport",
    summary = "Get a student's report card",
    params(
        ("id" = i32, Path, description = "Result batch ID"),
        ("student_id" = i32, Path, description = "Student ID"),
    ),
    responses(
        (status = 200, description = "Report card", body = ReportCardResponse),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Batch, student or results not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, student_id))]
pub async fn get_student_report(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((id, student_id)): Path<(i32, i32)>,
) -> Result<Json<ReportCardResponse>, AppError> {
    auth_user.require_permission(VIEW)?;

    let report = result_service(&state.db, &state.config.results)
        .student_report(auth_user.school_id, id, student_id)
        .await?;

    Ok(Json(report.into()))
}
