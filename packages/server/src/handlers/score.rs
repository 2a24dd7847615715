use std::collections::{HashMap, HashSet};

use axum::{Json, extract::State};
use chrono::Utc;
use common::AssessmentScope;
use common::ranking::TIE_TOLERANCE;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{class_subject, score, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::score::*;
use crate::results::layout::{LayoutComponent, resolve_layout};
use crate::state::AppState;
use crate::utils::school::{find_arm_of_class, find_class_arm, find_session_term, find_subject};

/// Maximum obtainable score at a coordinate, or a validation error if the
/// coordinate is not part of the layout.
fn coordinate_max(
    components: &HashMap<i32, &LayoutComponent>,
    entry: &ScoreEntryRequest,
) -> Result<f64, AppError> {
    let component = components.get(&entry.component_id).ok_or_else(|| {
        AppError::Validation(format!(
            "Component {} is not part of the assigned marking scheme",
            entry.component_id
        ))
    })?;

    match (component.sub_components.is_empty(), entry.ca_component_id) {
        (true, None) => Ok(component.max_score),
        (true, Some(_)) => Err(AppError::Validation(format!(
            "Component '{}' has no sub-components",
            component.name
        ))),
        (false, None) => Err(AppError::Validation(format!(
            "Component '{}' is scored per sub-component; ca_component_id is required",
            component.name
        ))),
        (false, Some(sub_id)) => component
            .sub_components
            .iter()
            .find(|s| s.id == sub_id)
            .map(|s| s.max_score)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Sub-component {sub_id} does not belong to component '{}'",
                    component.name
                ))
            }),
    }
}

/// Bulk-enter scores for one subject in one class arm.
#[utoipa::path(
    put,
    path = "/",
    tag = "Scores",
    operation_id = "upsertScores",
    summary = "Enter scores",
    description = "Inserts or overwrites raw scores. Each entry is checked against the marking scheme assigned to the class for the term: the coordinate must exist and the score may not exceed its maximum. Requires `score:enter`.",
    request_body = UpsertScoresRequest,
    responses(
        (status = 200, description = "Scores saved", body = UpsertScoresResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entity or marking scheme not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(subject_id = payload.subject_id, entries = payload.entries.len()))]
pub async fn upsert_scores(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpsertScoresRequest>,
) -> Result<Json<UpsertScoresResponse>, AppError> {
    auth_user.require_permission("score:enter")?;
    validate_upsert_scores_request(&payload)?;

    let school_id = auth_user.school_id;
    let txn = state.db.begin().await?;

    let (session, term) =
        find_session_term(&txn, school_id, payload.session_id, payload.term_id).await?;
    let (class, arm) =
        find_arm_of_class(&txn, school_id, payload.class_id, payload.class_arm_id).await?;
    let subject = find_subject(&txn, school_id, payload.subject_id).await?;

    if class_subject::Entity::find_by_id((class.id, subject.id))
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::Validation(format!(
            "Subject '{}' is not offered by class '{}'",
            subject.name, class.name
        )));
    }

    let layout = resolve_layout(&txn, school_id, class.id, term.id, AssessmentScope::Exam, None).await?;
    let components: HashMap<i32, &LayoutComponent> =
        layout.components.iter().map(|c| (c.id, c)).collect();

    for entry in &payload.entries {
        let max = coordinate_max(&components, entry)?;
        if entry.score > max + TIE_TOLERANCE {
            return Err(AppError::Validation(format!(
                "Score {} for student {} exceeds the maximum of {max}",
                entry.score, entry.student_id
            )));
        }
    }

    let student_ids: HashSet<i32> = payload.entries.iter().map(|e| e.student_id).collect();
    let enrolled = student::Entity::find()
        .filter(student::Column::SchoolId.eq(school_id))
        .filter(student::Column::ClassArmId.eq(arm.id))
        .filter(student::Column::Id.is_in(student_ids.iter().copied()))
        .count(&txn)
        .await?;
    if enrolled as usize != student_ids.len() {
        return Err(AppError::Validation(
            "One or more students are not enrolled in this class arm".into(),
        ));
    }

    let now = Utc::now();
    let new_row = |entry: &ScoreEntryRequest| score::ActiveModel {
        school_id: Set(school_id),
        session_id: Set(session.id),
        term_id: Set(term.id),
        class_id: Set(class.id),
        class_arm_id: Set(arm.id),
        subject_id: Set(subject.id),
        student_id: Set(entry.student_id),
        component_id: Set(entry.component_id),
        ca_component_id: Set(entry.ca_component_id),
        score: Set(entry.score),
        recorded_by: Set(auth_user.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let (sub_entries, component_entries): (Vec<_>, Vec<_>) = payload
        .entries
        .iter()
        .partition(|e| e.ca_component_id.is_some());

    if !sub_entries.is_empty() {
        score::Entity::insert_many(sub_entries.iter().map(|e| new_row(e)))
            .on_conflict(
                OnConflict::columns([
                    score::Column::SessionId,
                    score::Column::TermId,
                    score::Column::SubjectId,
                    score::Column::StudentId,
                    score::Column::ComponentId,
                    score::Column::CaComponentId,
                ])
                .update_columns([
                    score::Column::Score,
                    score::Column::ClassId,
                    score::Column::ClassArmId,
                    score::Column::RecordedBy,
                    score::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;
    }

    // Component-level rows have a NULL sub-component, which the composite key
    // cannot match on, so they are updated in place or inserted.
    for entry in component_entries {
        let updated = score::Entity::update_many()
            .col_expr(score::Column::Score, Expr::value(entry.score))
            .col_expr(score::Column::ClassId, Expr::value(class.id))
            .col_expr(score::Column::ClassArmId, Expr::value(arm.id))
            .col_expr(score::Column::RecordedBy, Expr::value(auth_user.user_id))
            .col_expr(score::Column::UpdatedAt, Expr::value(now))
            .filter(score::Column::SessionId.eq(session.id))
            .filter(score::Column::TermId.eq(term.id))
            .filter(score::Column::SubjectId.eq(subject.id))
            .filter(score::Column::StudentId.eq(entry.student_id))
            .filter(score::Column::ComponentId.eq(entry.component_id))
            .filter(score::Column::CaComponentId.is_null())
            .exec(&txn)
            .await?;
        if updated.rows_affected == 0 {
            new_row(entry).insert(&txn).await.map_err(|e| {
                crate::error::conflict_on_duplicate(e, "Scores were changed concurrently; retry")
            })?;
        }
    }

    txn.commit().await?;

    info!(
        class_arm_id = arm.id,
        subject_id = subject.id,
        saved = payload.entries.len(),
        "Scores saved"
    );

    Ok(Json(UpsertScoresResponse {
        saved: payload.entries.len(),
    }))
}

/// Score sheet of one subject in one class arm.
#[utoipa::path(
    get,
    path = "/",
    tag = "Scores",
    operation_id = "listScores",
    summary = "Get a score sheet",
    params(ScoreSheetParams),
    responses(
        (status = 200, description = "Scores", body = Vec<ScoreResponse>),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Entity not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, params))]
pub async fn list_scores(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ScoreSheetParams>,
) -> Result<Json<Vec<ScoreResponse>>, AppError> {
    auth_user.require_permission("score:view")?;

    let school_id = auth_user.school_id;
    let (session, term) =
        find_session_term(&state.db, school_id, params.session_id, params.term_id).await?;
    let arm = find_class_arm(&state.db, school_id, params.class_arm_id).await?;
    let subject = find_subject(&state.db, school_id, params.subject_id).await?;

    let scores = score::Entity::find()
        .filter(score::Column::SchoolId.eq(school_id))
        .filter(score::Column::SessionId.eq(session.id))
        .filter(score::Column::TermId.eq(term.id))
        .filter(score::Column::ClassArmId.eq(arm.id))
        .filter(score::Column::SubjectId.eq(subject.id))
        .order_by_asc(score::Column::StudentId)
        .order_by_asc(score::Column::ComponentId)
        .order_by_asc(score::Column::CaComponentId)
        .all(&state.db)
        .await?;

    Ok(Json(scores.into_iter().map(Into::into).collect()))
}
