use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::score;
use crate::error::AppError;

/// Maximum entries in one bulk upsert.
pub const MAX_SCORE_ENTRIES: usize = 2000;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ScoreEntryRequest {
    #[schema(example = 1)]
    pub student_id: i32,
    /// Marking-scheme component id.
    #[schema(example = 2)]
    pub component_id: i32,
    /// Required for components with sub-components, absent otherwise.
    #[schema(example = 10)]
    pub ca_component_id: Option<i32>,
    #[schema(example = 15.5)]
    pub score: f64,
}

/// Bulk score entry for one subject in one class arm.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpsertScoresRequest {
    pub session_id: i32,
    pub term_id: i32,
    pub class_id: i32,
    pub class_arm_id: i32,
    pub subject_id: i32,
    pub entries: Vec<ScoreEntryRequest>,
}

/// Shape checks that need no database access.
pub fn validate_upsert_scores_request(payload: &UpsertScoresRequest) -> Result<(), AppError> {
    if payload.entries.is_empty() {
        return Err(AppError::Validation("entries must not be empty".into()));
    }
    if payload.entries.len() > MAX_SCORE_ENTRIES {
        return Err(AppError::Validation(format!(
            "Too many entries: max {MAX_SCORE_ENTRIES}"
        )));
    }

    let mut seen = HashSet::new();
    for entry in &payload.entries {
        if !entry.score.is_finite() || entry.score < 0.0 {
            return Err(AppError::Validation(format!(
                "Score for student {} must be a non-negative number",
                entry.student_id
            )));
        }
        if !seen.insert((entry.student_id, entry.component_id, entry.ca_component_id)) {
            return Err(AppError::Validation(format!(
                "Duplicate entry for student {} and component {}",
                entry.student_id, entry.component_id
            )));
        }
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UpsertScoresResponse {
    /// Number of score rows inserted or updated.
    #[schema(example = 60)]
    pub saved: usize,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ScoreSheetParams {
    pub session_id: i32,
    pub term_id: i32,
    pub class_arm_id: i32,
    pub subject_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScoreResponse {
    pub id: i32,
    pub student_id: i32,
    pub subject_id: i32,
    pub component_id: i32,
    pub ca_component_id: Option<i32>,
    #[schema(example = 15.5)]
    pub score: f64,
    pub recorded_by: i32,
    pub updated_at: DateTime<Utc>,
}

impl From<score::Model> for ScoreResponse {
    fn from(m: score::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            subject_id: m.subject_id,
            component_id: m.component_id,
            ca_component_id: m.ca_component_id,
            score: m.score,
            recorded_by: m.recorded_by,
            updated_at: m.updated_at,
        }
    }
}
