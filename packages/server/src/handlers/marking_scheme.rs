use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{ca_component, marking_scheme, marking_scheme_assignment, marking_scheme_component};
use crate::error::{AppError, ErrorBody, conflict_on_duplicate};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::marking_scheme::*;
use crate::results::layout::{MarkingSchemeLayout, load_components, resolve_layout};
use crate::state::AppState;
use crate::utils::school::{find_class, find_marking_scheme, find_term};

const MANAGE: &str = "marking_scheme:manage";

/// Create a marking scheme with its components and CA sub-components.
#[utoipa::path(
    post,
    path = "/",
    tag = "Marking Schemes",
    operation_id = "createMarkingScheme",
    summary = "Create a marking scheme",
    description = "Creates a scheme; its `total_score` is the sum of the component maxima. Only `CA` components may have sub-components, and their maxima may not exceed the component's. Requires `marking_scheme:manage`.",
    request_body = CreateMarkingSchemeRequest,
    responses(
        (status = 201, description = "Scheme created", body = MarkingSchemeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate name (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_marking_scheme(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateMarkingSchemeRequest>,
) -> Result<(StatusCode, Json<MarkingSchemeResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    let (name, total_score) = validate_create_marking_scheme_request(&payload)?;

    let txn = state.db.begin().await?;

    let scheme = marking_scheme::ActiveModel {
        school_id: Set(auth_user.school_id),
        name: Set(name),
        total_score: Set(total_score),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| conflict_on_duplicate(e, "A marking scheme with this name already exists"))?;

    for (position, component) in payload.components.iter().enumerate() {
        let saved = marking_scheme_component::ActiveModel {
            marking_scheme_id: Set(scheme.id),
            name: Set(component.name.trim().to_string()),
            score: Set(component.score),
            component_type: Set(component.component_type),
            position: Set(position as i32),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (sub_position, sub) in component.sub_components.iter().enumerate() {
            ca_component::ActiveModel {
                component_id: Set(saved.id),
                name: Set(sub.name.trim().to_string()),
                score: Set(sub.score),
                position: Set(sub_position as i32),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    let components = load_components(&txn, scheme.id).await?;
    txn.commit().await?;

    info!(scheme_id = scheme.id, total_score, "Marking scheme created");

    Ok((
        StatusCode::CREATED,
        Json(MarkingSchemeResponse {
            scheme: scheme.into(),
            components,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Marking Schemes",
    operation_id = "listMarkingSchemes",
    summary = "List marking schemes",
    responses(
        (status = 200, description = "Schemes", body = Vec<MarkingSchemeSummary>),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_marking_schemes(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<MarkingSchemeSummary>>, AppError> {
    auth_user.require_permission(MANAGE)?;

    let schemes = marking_scheme::Entity::find()
        .filter(marking_scheme::Column::SchoolId.eq(auth_user.school_id))
        .order_by_asc(marking_scheme::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(schemes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Marking Schemes",
    operation_id = "getMarkingScheme",
    summary = "Get a marking scheme with its components",
    params(("id" = i32, Path, description = "Marking scheme ID")),
    responses(
        (status = 200, description = "Scheme", body = MarkingSchemeResponse),
        (status = 404, description = "Not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_marking_scheme(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MarkingSchemeResponse>, AppError> {
    auth_user.require_permission(MANAGE)?;

    let scheme = find_marking_scheme(&state.db, auth_user.school_id, id).await?;
    let components = load_components(&state.db, scheme.id).await?;

    Ok(Json(MarkingSchemeResponse {
        scheme: scheme.into(),
        components,
    }))
}

/// Assign a scheme to a class for a term.
#[utoipa::path(
    post,
    path = "/{id}/assignments",
    tag = "Marking Schemes",
    operation_id = "assignMarkingScheme",
    summary = "Assign a scheme to a class and term",
    description = "A class has one scheme per term; assigning again replaces the previous scheme.",
    params(("id" = i32, Path, description = "Marking scheme ID")),
    request_body = AssignMarkingSchemeRequest,
    responses(
        (status = 200, description = "Assignment", body = AssignmentResponse),
        (status = 404, description = "Scheme, class or term not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn assign_marking_scheme(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<AssignMarkingSchemeRequest>,
) -> Result<Json<AssignmentResponse>, AppError> {
    auth_user.require_permission(MANAGE)?;

    let scheme = find_marking_scheme(&state.db, auth_user.school_id, id).await?;
    let class = find_class(&state.db, auth_user.school_id, payload.class_id).await?;
    let term = find_term(&state.db, auth_user.school_id, payload.term_id).await?;

    marking_scheme_assignment::Entity::insert(marking_scheme_assignment::ActiveModel {
        school_id: Set(auth_user.school_id),
        marking_scheme_id: Set(scheme.id),
        class_id: Set(class.id),
        term_id: Set(term.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    })
    .on_conflict(
        OnConflict::columns([
            marking_scheme_assignment::Column::ClassId,
            marking_scheme_assignment::Column::TermId,
        ])
        .update_columns([
            marking_scheme_assignment::Column::MarkingSchemeId,
            marking_scheme_assignment::Column::CreatedAt,
        ])
        .to_owned(),
    )
    .exec_without_returning(&state.db)
    .await?;

    let assignment = marking_scheme_assignment::Entity::find()
        .filter(marking_scheme_assignment::Column::ClassId.eq(class.id))
        .filter(marking_scheme_assignment::Column::TermId.eq(term.id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("assignment missing after upsert".into()))?;

    Ok(Json(assignment.into()))
}

/// Resolve the layout a class/term/scope computes against.
#[utoipa::path(
    get,
    path = "/layout",
    tag = "Marking Schemes",
    operation_id = "getMarkingSchemeLayout",
    summary = "Resolve the result layout",
    description = "Returns the components and ordered columns of the scheme assigned to the class for the term, narrowed to one component for `CA` scope. Requires `score:view`.",
    params(LayoutParams),
    responses(
        (status = 200, description = "Layout", body = MarkingSchemeLayout),
        (status = 400, description = "Bad scope or missing result type (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No scheme assigned (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, params))]
pub async fn get_layout(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<LayoutParams>,
) -> Result<Json<MarkingSchemeLayout>, AppError> {
    auth_user.require_permission("score:view")?;
    let scope = parse_scope(&params.scope)?;
    let class = find_class(&state.db, auth_user.school_id, params.class_id).await?;
    let term = find_term(&state.db, auth_user.school_id, params.term_id).await?;

    let layout = resolve_layout(
        &state.db,
        auth_user.school_id,
        class.id,
        term.id,
        scope,
        params.result_type_id,
    )
    .await?;

    Ok(Json(layout))
}
