//! Tenant-scoped lookups.
//!
//! Every finder filters by `school_id` as well as the primary key, so an id
//! belonging to another school is reported exactly like a missing one.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::{
    academic_session, class_arm, grading_system, marking_scheme, school, school_class, student,
    subject, term,
};
use crate::error::AppError;

/// Look up a school by ID, returning 404 if not found.
pub async fn find_school<C: ConnectionTrait>(db: &C, id: i32) -> Result<school::Model, AppError> {
    school::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("School not found".into()))
}

pub async fn find_session<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<academic_session::Model, AppError> {
    academic_session::Entity::find_by_id(id)
        .filter(academic_session::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".into()))
}

pub async fn find_term<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<term::Model, AppError> {
    term::Entity::find_by_id(id)
        .filter(term::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Term not found".into()))
}

/// Look up a term and check it belongs to the given session.
pub async fn find_session_term<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    session_id: i32,
    term_id: i32,
) -> Result<(academic_session::Model, term::Model), AppError> {
    let session = find_session(db, school_id, session_id).await?;
    let term = find_term(db, school_id, term_id).await?;
    if term.session_id != session.id {
        return Err(AppError::Validation(
            "Term does not belong to the given session".into(),
        ));
    }
    Ok((session, term))
}

pub async fn find_class<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<school_class::Model, AppError> {
    school_class::Entity::find_by_id(id)
        .filter(school_class::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Class not found".into()))
}

pub async fn find_class_arm<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<class_arm::Model, AppError> {
    class_arm::Entity::find_by_id(id)
        .filter(class_arm::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Class arm not found".into()))
}

/// Look up a class arm and check it belongs to the given class.
pub async fn find_arm_of_class<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    class_id: i32,
    arm_id: i32,
) -> Result<(school_class::Model, class_arm::Model), AppError> {
    let class = find_class(db, school_id, class_id).await?;
    let arm = find_class_arm(db, school_id, arm_id).await?;
    if arm.class_id != class.id {
        return Err(AppError::Validation(
            "Class arm does not belong to the given class".into(),
        ));
    }
    Ok((class, arm))
}

pub async fn find_subject<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<subject::Model, AppError> {
    subject::Entity::find_by_id(id)
        .filter(subject::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Subject not found".into()))
}

pub async fn find_student<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<student::Model, AppError> {
    student::Entity::find_by_id(id)
        .filter(student::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Student not found".into()))
}

pub async fn find_marking_scheme<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<marking_scheme::Model, AppError> {
    marking_scheme::Entity::find_by_id(id)
        .filter(marking_scheme::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Marking scheme not found".into()))
}

pub async fn find_grading_system<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    id: i32,
) -> Result<grading_system::Model, AppError> {
    grading_system::Entity::find_by_id(id)
        .filter(grading_system::Column::SchoolId.eq(school_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Grading system not found".into()))
}
