use chrono::{DateTime, Utc};
use common::GradeBand;
use common::grading::validate_bands;
use serde::{Deserialize, Serialize};

use super::shared::validate_name;
use crate::entity::{grade_band, grading_system};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GradeBandRequest {
    #[schema(example = "A")]
    pub grade: String,
    #[schema(example = 70.0)]
    pub score_start_point: f64,
    #[schema(example = 100.0)]
    pub score_end_point: f64,
    #[schema(example = "Excellent")]
    pub remark: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateGradingSystemRequest {
    #[schema(example = "Standard WAEC")]
    pub name: String,
    /// Non-overlapping bands; both ends of each interval are inclusive.
    pub bands: Vec<GradeBandRequest>,
}

/// Validate a grading system and return its trimmed name and bands.
pub fn validate_create_grading_system_request(
    payload: &CreateGradingSystemRequest,
) -> Result<(String, Vec<GradeBand>), AppError> {
    let name = validate_name(&payload.name, "Grading system name", 128)?;

    let bands = payload
        .bands
        .iter()
        .map(|b| {
            Ok(GradeBand {
                id: None,
                grade: validate_name(&b.grade, "Grade", 8)?,
                score_start_point: b.score_start_point,
                score_end_point: b.score_end_point,
                remark: b.remark.trim().to_string(),
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    if bands
        .iter()
        .any(|b| !b.score_start_point.is_finite() || !b.score_end_point.is_finite())
    {
        return Err(AppError::Validation("Band bounds must be finite".into()));
    }
    validate_bands(&bands).map_err(|e| AppError::Validation(e.to_string()))?;
    Ok((name, bands))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GradeBandResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "A")]
    pub grade: String,
    #[schema(example = 70.0)]
    pub score_start_point: f64,
    #[schema(example = 100.0)]
    pub score_end_point: f64,
    #[schema(example = "Excellent")]
    pub remark: String,
}

impl From<grade_band::Model> for GradeBandResponse {
    fn from(m: grade_band::Model) -> Self {
        Self {
            id: m.id,
            grade: m.grade,
            score_start_point: m.score_start_point,
            score_end_point: m.score_end_point,
            remark: m.remark,
        }
    }
}

impl From<GradeBand> for GradeBandResponse {
    fn from(band: GradeBand) -> Self {
        Self {
            id: band.id.unwrap_or_default(),
            grade: band.grade,
            score_start_point: band.score_start_point,
            score_end_point: band.score_end_point,
            remark: band.remark,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GradingSystemSummary {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Standard WAEC")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<grading_system::Model> for GradingSystemSummary {
    fn from(m: grading_system::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GradingSystemResponse {
    #[serde(flatten)]
    pub system: GradingSystemSummary,
    /// Bands ordered by descending start point.
    pub bands: Vec<GradeBandResponse>,
    /// Classes currently using this system.
    pub class_ids: Vec<i32>,
}

/// Point the given classes at a grading system. A class previously assigned
/// to another system is moved.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AssignGradingSystemRequest {
    #[schema(example = json!([1, 2]))]
    pub class_ids: Vec<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ResolveGradeParams {
    pub class_id: i32,
    #[param(example = 72.5)]
    pub score: f64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResolveGradeResponse {
    #[schema(example = 72.5)]
    pub score: f64,
    /// `null` when no band contains the score or the class has no grading system.
    pub grade: Option<GradeBandResponse>,
}
