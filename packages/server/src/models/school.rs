use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::auth::{validate_password, validate_username};
use super::shared::validate_name;
use crate::error::AppError;

/// Request body for onboarding a new school together with its first admin.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSchoolRequest {
    #[schema(example = "Greenfield College")]
    pub name: String,
    #[schema(example = "greenfield_admin")]
    pub admin_username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub admin_password: String,
}

pub fn validate_create_school_request(payload: &CreateSchoolRequest) -> Result<String, AppError> {
    let name = validate_name(&payload.name, "School name", 128)?;
    validate_username(&payload.admin_username)?;
    validate_password(&payload.admin_password)?;
    Ok(name)
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SchoolResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Greenfield College")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::school::Model> for SchoolResponse {
    fn from(m: crate::entity::school::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

/// Response to onboarding: the school and the id of its admin account.
#[derive(Serialize, utoipa::ToSchema)]
pub struct OnboardResponse {
    pub school: SchoolResponse,
    #[schema(example = 1)]
    pub admin_user_id: i32,
    #[schema(example = "greenfield_admin")]
    pub admin_username: String,
}
