use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::{AssessmentScope, ComponentType};
use serde::{Deserialize, Serialize};

use super::shared::{validate_max_score, validate_name};
use crate::error::AppError;
use crate::results::layout::LayoutComponent;

/// Maximum components per scheme.
const MAX_COMPONENTS: usize = 20;
/// Maximum sub-components per CA component.
const MAX_SUB_COMPONENTS: usize = 20;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubComponentRequest {
    #[schema(example = "Test 1")]
    pub name: String,
    #[schema(example = 20.0)]
    pub score: f64,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateComponentRequest {
    #[schema(example = "CA")]
    pub name: String,
    /// Maximum points for the component.
    #[schema(example = 40.0)]
    pub score: f64,
    pub component_type: ComponentType,
    /// Only allowed on `CA` components. Their maxima may not exceed `score`.
    #[serde(default)]
    pub sub_components: Vec<CreateSubComponentRequest>,
}

/// Create a marking scheme with its components in display order.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMarkingSchemeRequest {
    #[schema(example = "Junior secondary")]
    pub name: String,
    pub components: Vec<CreateComponentRequest>,
}

/// Validate a scheme definition and return `(trimmed name, total score)`.
pub fn validate_create_marking_scheme_request(
    payload: &CreateMarkingSchemeRequest,
) -> Result<(String, f64), AppError> {
    let name = validate_name(&payload.name, "Marking scheme name", 128)?;

    if payload.components.is_empty() {
        return Err(AppError::Validation(
            "A marking scheme needs at least one component".into(),
        ));
    }
    if payload.components.len() > MAX_COMPONENTS {
        return Err(AppError::Validation(format!(
            "Too many components: max {MAX_COMPONENTS}"
        )));
    }

    let mut names = HashSet::new();
    for component in &payload.components {
        let component_name = validate_name(&component.name, "Component name", 64)?;
        if !names.insert(component_name.to_lowercase()) {
            return Err(AppError::Validation(format!(
                "Duplicate component name '{component_name}'"
            )));
        }
        validate_max_score(component.score, "Component score")?;

        if component.sub_components.is_empty() {
            continue;
        }
        if !component.component_type.allows_sub_components() {
            return Err(AppError::Validation(format!(
                "Only CA components may have sub-components ('{component_name}' is {})",
                component.component_type
            )));
        }
        if component.sub_components.len() > MAX_SUB_COMPONENTS {
            return Err(AppError::Validation(format!(
                "Too many sub-components in '{component_name}': max {MAX_SUB_COMPONENTS}"
            )));
        }

        let mut sub_names = HashSet::new();
        let mut sub_total = 0.0;
        for sub in &component.sub_components {
            let sub_name = validate_name(&sub.name, "Sub-component name", 64)?;
            if !sub_names.insert(sub_name.to_lowercase()) {
                return Err(AppError::Validation(format!(
                    "Duplicate sub-component name '{sub_name}' in '{component_name}'"
                )));
            }
            validate_max_score(sub.score, "Sub-component score")?;
            sub_total += sub.score;
        }
        if sub_total > component.score + common::ranking::TIE_TOLERANCE {
            return Err(AppError::Validation(format!(
                "Sub-components of '{component_name}' add up to {sub_total}, more than its maximum of {}",
                component.score
            )));
        }
    }

    let total = payload.components.iter().map(|c| c.score).sum();
    Ok((name, total))
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MarkingSchemeSummary {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Junior secondary")]
    pub name: String,
    #[schema(example = 140.0)]
    pub total_score: f64,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::marking_scheme::Model> for MarkingSchemeSummary {
    fn from(m: crate::entity::marking_scheme::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            total_score: m.total_score,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MarkingSchemeResponse {
    #[serde(flatten)]
    pub scheme: MarkingSchemeSummary,
    pub components: Vec<LayoutComponent>,
}

/// Assign a scheme to a class for a term. Replaces any existing assignment
/// for the same class and term.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct AssignMarkingSchemeRequest {
    #[schema(example = 1)]
    pub class_id: i32,
    #[schema(example = 1)]
    pub term_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    pub id: i32,
    pub marking_scheme_id: i32,
    pub class_id: i32,
    pub term_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::marking_scheme_assignment::Model> for AssignmentResponse {
    fn from(m: crate::entity::marking_scheme_assignment::Model) -> Self {
        Self {
            id: m.id,
            marking_scheme_id: m.marking_scheme_id,
            class_id: m.class_id,
            term_id: m.term_id,
            created_at: m.created_at,
        }
    }
}

/// `GET /marking-schemes/layout` parameters.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LayoutParams {
    pub class_id: i32,
    pub term_id: i32,
    /// `CA` or `EXAM` (case-insensitive).
    #[param(example = "EXAM")]
    pub scope: String,
    /// Component id; required when `scope` is `CA`.
    pub result_type_id: Option<i32>,
}

pub fn parse_scope(scope: &str) -> Result<AssessmentScope, AppError> {
    scope
        .parse::<AssessmentScope>()
        .map_err(|e| AppError::Validation(e.to_string()))
}
