use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{
    academic_session, class_arm, class_subject, school_class, student, subject, term,
};
use crate::error::{AppError, ErrorBody, conflict_on_duplicate};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::academic::*;
use crate::models::shared::{Pagination, validate_bulk_ids, validate_name};
use crate::state::AppState;
use crate::utils::school::{find_arm_of_class, find_class, find_session};

const MANAGE: &str = "academic:manage";
const VIEW: &str = "academic:view";

// ---------------------------------------------------------------------------
// Sessions and terms
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/",
    tag = "Academic Structure",
    operation_id = "createSession",
    summary = "Create an academic session",
    request_body = CreateNamedRequest,
    responses(
        (status = 201, description = "Session created", body = SessionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Duplicate name (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNamedRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    let name = payload.validated_name()?;

    let session = academic_session::ActiveModel {
        school_id: Set(auth_user.school_id),
        name: Set(name),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_duplicate(e, "A session with this name already exists"))?;

    Ok((StatusCode::CREATED, Json(session.into())))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Academic Structure",
    operation_id = "listSessions",
    summary = "List academic sessions",
    responses(
        (status = 200, description = "Sessions", body = Vec<SessionResponse>),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_sessions(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    auth_user.require_permission(VIEW)?;

    let sessions = academic_session::Entity::find()
        .filter(academic_session::Column::SchoolId.eq(auth_user.school_id))
        .order_by_desc(academic_session::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/terms",
    tag = "Academic Structure",
    operation_id = "createTerm",
    summary = "Create a term in a session",
    params(("id" = i32, Path, description = "Session ID")),
    request_body = CreateNamedRequest,
    responses(
        (status = 201, description = "Term created", body = TermResponse),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate name (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(session_id))]
pub async fn create_term(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
    AppJson(payload): AppJson<CreateNamedRequest>,
) -> Result<(StatusCode, Json<TermResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    let name = payload.validated_name()?;
    let session = find_session(&state.db, auth_user.school_id, session_id).await?;

    let term = term::ActiveModel {
        school_id: Set(auth_user.school_id),
        session_id: Set(session.id),
        name: Set(name),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_duplicate(e, "A term with this name already exists in the session"))?;

    Ok((StatusCode::CREATED, Json(term.into())))
}

#[utoipa::path(
    get,
    path = "/{id}/terms",
    tag = "Academic Structure",
    operation_id = "listTerms",
    summary = "List the terms of a session",
    params(("id" = i32, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Terms", body = Vec<TermResponse>),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(session_id))]
pub async fn list_terms(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<i32>,
) -> Result<Json<Vec<TermResponse>>, AppError> {
    auth_user.require_permission(VIEW)?;
    let session = find_session(&state.db, auth_user.school_id, session_id).await?;

    let terms = term::Entity::find()
        .filter(term::Column::SessionId.eq(session.id))
        .order_by_asc(term::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(terms.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Classes, arms and subjects offered
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/",
    tag = "Academic Structure",
    operation_id = "createClass",
    summary = "Create a class",
    request_body = CreateNamedRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 409, description = "Duplicate name (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_class(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNamedRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    let name = payload.validated_name()?;

    let class = school_class::ActiveModel {
        school_id: Set(auth_user.school_id),
        name: Set(name),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_duplicate(e, "A class with this name already exists"))?;

    Ok((StatusCode::CREATED, Json(class.into())))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Academic Structure",
    operation_id = "listClasses",
    summary = "List classes",
    responses((status = 200, description = "Classes", body = Vec<ClassResponse>)),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_classes(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, AppError> {
    auth_user.require_permission(VIEW)?;

    let classes = school_class::Entity::find()
        .filter(school_class::Column::SchoolId.eq(auth_user.school_id))
        .order_by_asc(school_class::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(classes.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/{id}/arms",
    tag = "Academic Structure",
    operation_id = "createClassArm",
    summary = "Create an arm of a class",
    params(("id" = i32, Path, description = "Class ID")),
    request_body = CreateNamedRequest,
    responses(
        (status = 201, description = "Arm created", body = ClassArmResponse),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate name (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(class_id))]
pub async fn create_class_arm(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<i32>,
    AppJson(payload): AppJson<CreateNamedRequest>,
) -> Result<(StatusCode, Json<ClassArmResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    let name = payload.validated_name()?;
    let class = find_class(&state.db, auth_user.school_id, class_id).await?;

    let arm = class_arm::ActiveModel {
        school_id: Set(auth_user.school_id),
        class_id: Set(class.id),
        name: Set(name),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_duplicate(e, "An arm with this name already exists in the class"))?;

    Ok((StatusCode::CREATED, Json(arm.into())))
}

#[utoipa::path(
    get,
    path = "/{id}/arms",
    tag = "Academic Structure",
    operation_id = "listClassArms",
    summary = "List the arms of a class",
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Arms", body = Vec<ClassArmResponse>),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(class_id))]
pub async fn list_class_arms(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<i32>,
) -> Result<Json<Vec<ClassArmResponse>>, AppError> {
    auth_user.require_permission(VIEW)?;
    let class = find_class(&state.db, auth_user.school_id, class_id).await?;

    let arms = class_arm::Entity::find()
        .filter(class_arm::Column::ClassId.eq(class.id))
        .order_by_asc(class_arm::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(arms.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/{id}/subjects",
    tag = "Academic Structure",
    operation_id = "setClassSubjects",
    summary = "Replace the subjects a class offers",
    params(("id" = i32, Path, description = "Class ID")),
    request_body = SetClassSubjectsRequest,
    responses(
        (status = 200, description = "Subjects now offered", body = Vec<SubjectResponse>),
        (status = 400, description = "Unknown subject (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(class_id))]
pub async fn set_class_subjects(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<i32>,
    AppJson(payload): AppJson<SetClassSubjectsRequest>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    auth_user.require_permission(MANAGE)?;
    // An empty list clears the class's subjects.
    if !payload.subject_ids.is_empty() {
        validate_bulk_ids(&payload.subject_ids, "subject_ids", 100)?;
    }

    let txn = state.db.begin().await?;
    let class = find_class(&txn, auth_user.school_id, class_id).await?;

    let subjects = subject::Entity::find()
        .filter(subject::Column::SchoolId.eq(auth_user.school_id))
        .filter(subject::Column::Id.is_in(payload.subject_ids.clone()))
        .order_by_asc(subject::Column::Name)
        .all(&txn)
        .await?;
    if subjects.len() != payload.subject_ids.len() {
        return Err(AppError::Validation(
            "One or more subjects do not exist in this school".into(),
        ));
    }

    class_subject::Entity::delete_many()
        .filter(class_subject::Column::ClassId.eq(class.id))
        .exec(&txn)
        .await?;
    if !subjects.is_empty() {
        class_subject::Entity::insert_many(subjects.iter().map(|s| class_subject::ActiveModel {
            class_id: Set(class.id),
            subject_id: Set(s.id),
        }))
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;

    info!(class_id = class.id, subjects = subjects.len(), "Class subjects replaced");
    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}/subjects",
    tag = "Academic Structure",
    operation_id = "listClassSubjects",
    summary = "List the subjects a class offers",
    params(("id" = i32, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Subjects", body = Vec<SubjectResponse>),
        (status = 404, description = "Class not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(class_id))]
pub async fn list_class_subjects(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(class_id): Path<i32>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    auth_user.require_permission(VIEW)?;
    let class = find_class(&state.db, auth_user.school_id, class_id).await?;

    let subject_ids: Vec<i32> = class_subject::Entity::find()
        .filter(class_subject::Column::ClassId.eq(class.id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|cs| cs.subject_id)
        .collect();
    if subject_ids.is_empty() {
        return Ok(Json(vec![]));
    }

    let subjects = subject::Entity::find()
        .filter(subject::Column::Id.is_in(subject_ids))
        .order_by_asc(subject::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Subjects
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/",
    tag = "Academic Structure",
    operation_id = "createSubject",
    summary = "Create a subject",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 409, description = "Duplicate code (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_subject(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<SubjectResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    let (name, code) = validate_create_subject_request(&payload)?;

    let subject = subject::ActiveModel {
        school_id: Set(auth_user.school_id),
        name: Set(name),
        code: Set(code),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_duplicate(e, "A subject with this code already exists"))?;

    Ok((StatusCode::CREATED, Json(subject.into())))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Academic Structure",
    operation_id = "listSubjects",
    summary = "List subjects",
    responses((status = 200, description = "Subjects", body = Vec<SubjectResponse>)),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_subjects(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>, AppError> {
    auth_user.require_permission(VIEW)?;

    let subjects = subject::Entity::find()
        .filter(subject::Column::SchoolId.eq(auth_user.school_id))
        .order_by_asc(subject::Column::Name)
        .all(&state.db)
        .await?;

    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/",
    tag = "Academic Structure",
    operation_id = "createStudent",
    summary = "Enrol a student in a class arm",
    request_body = CreateStudentRequest,
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Arm not in class (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Class or arm not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate admission number (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn create_student(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<StudentResponse>), AppError> {
    auth_user.require_permission(MANAGE)?;
    validate_create_student_request(&payload)?;
    let (class, arm) = find_arm_of_class(
        &state.db,
        auth_user.school_id,
        payload.class_id,
        payload.class_arm_id,
    )
    .await?;

    let student = student::ActiveModel {
        school_id: Set(auth_user.school_id),
        first_name: Set(validate_name(&payload.first_name, "First name", 64)?),
        last_name: Set(validate_name(&payload.last_name, "Last name", 64)?),
        admission_number: Set(payload.admission_number.trim().to_string()),
        class_id: Set(class.id),
        class_arm_id: Set(arm.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(|e| conflict_on_duplicate(e, "A student with this admission number already exists"))?;

    Ok((StatusCode::CREATED, Json(student.into())))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Academic Structure",
    operation_id = "listStudents",
    summary = "List students",
    params(StudentListParams),
    responses((status = 200, description = "Students", body = StudentListResponse)),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, params))]
pub async fn list_students(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<StudentListParams>,
) -> Result<Json<StudentListResponse>, AppError> {
    auth_user.require_permission(VIEW)?;

    let page = std::cmp::Ord::max(params.page.unwrap_or(1), 1);
    let per_page = params.per_page.unwrap_or(50).clamp(1, 200);

    let mut query = student::Entity::find().filter(student::Column::SchoolId.eq(auth_user.school_id));
    if let Some(class_id) = params.class_id {
        query = query.filter(student::Column::ClassId.eq(class_id));
    }
    if let Some(arm_id) = params.class_arm_id {
        query = query.filter(student::Column::ClassArmId.eq(arm_id));
    }

    let total = query.clone().count(&state.db).await?;
    let students = query
        .order_by_asc(student::Column::LastName)
        .order_by_asc(student::Column::FirstName)
        .order_by_asc(student::Column::Id)
        .offset((page - 1) * per_page)
        .limit(per_page)
        .all(&state.db)
        .await?;

    Ok(Json(StudentListResponse {
        data: students.into_iter().map(Into::into).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}
