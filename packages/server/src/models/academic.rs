use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_name};
use crate::entity::{academic_session, class_arm, school_class, student, subject, term};
use crate::error::AppError;

/// Request body shared by resources that only carry a name
/// (sessions, terms, classes, arms).
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateNamedRequest {
    #[schema(example = "2024/2025")]
    pub name: String,
}

impl CreateNamedRequest {
    pub fn validated_name(&self) -> Result<String, AppError> {
        validate_name(&self.name, "Name", 64)
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SessionResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "2024/2025")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<academic_session::Model> for SessionResponse {
    fn from(m: academic_session::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TermResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub session_id: i32,
    #[schema(example = "First Term")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<term::Model> for TermResponse {
    fn from(m: term::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClassResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "JSS1")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<school_class::Model> for ClassResponse {
    fn from(m: school_class::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClassArmResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = 1)]
    pub class_id: i32,
    #[schema(example = "A")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<class_arm::Model> for ClassArmResponse {
    fn from(m: class_arm::Model) -> Self {
        Self {
            id: m.id,
            class_id: m.class_id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubjectRequest {
    #[schema(example = "Mathematics")]
    pub name: String,
    /// Short code, unique within the school.
    #[schema(example = "MTH")]
    pub code: String,
}

pub fn validate_create_subject_request(
    payload: &CreateSubjectRequest,
) -> Result<(String, String), AppError> {
    let name = validate_name(&payload.name, "Subject name", 128)?;
    let code = validate_name(&payload.code, "Subject code", 16)?.to_uppercase();
    Ok((name, code))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubjectResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Mathematics")]
    pub name: String,
    #[schema(example = "MTH")]
    pub code: String,
    pub created_at: DateTime<Utc>,
}

impl From<subject::Model> for SubjectResponse {
    fn from(m: subject::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            code: m.code,
            created_at: m.created_at,
        }
    }
}

/// Replace the set of subjects a class offers.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetClassSubjectsRequest {
    #[schema(example = json!([1, 2, 3]))]
    pub subject_ids: Vec<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStudentRequest {
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Obi")]
    pub last_name: String,
    /// Unique within the school.
    #[schema(example = "GF/2024/001")]
    pub admission_number: String,
    #[schema(example = 1)]
    pub class_id: i32,
    #[schema(example = 1)]
    pub class_arm_id: i32,
}

pub fn validate_create_student_request(payload: &CreateStudentRequest) -> Result<(), AppError> {
    validate_name(&payload.first_name, "First name", 64)?;
    validate_name(&payload.last_name, "Last name", 64)?;
    validate_name(&payload.admission_number, "Admission number", 32)?;
    Ok(())
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct StudentListParams {
    pub class_id: Option<i32>,
    pub class_arm_id: Option<i32>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Obi")]
    pub last_name: String,
    #[schema(example = "GF/2024/001")]
    pub admission_number: String,
    pub class_id: i32,
    pub class_arm_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<student::Model> for StudentResponse {
    fn from(m: student::Model) -> Self {
        Self {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            admission_number: m.admission_number,
            class_id: m.class_id,
            class_arm_id: m.class_arm_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentListResponse {
    pub data: Vec<StudentResponse>,
    pub pagination: Pagination,
}
