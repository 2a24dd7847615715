use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 20)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 3)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// `?page=&per_page=` query parameters.
#[derive(Deserialize, Default, utoipa::IntoParams)]
pub struct PageParams {
    /// Page number (default 1).
    pub page: Option<u64>,
    /// Items per page (default 20, max 100).
    pub per_page: Option<u64>,
}

impl PageParams {
    /// Clamp to `(page >= 1, 1 <= per_page <= 100)`.
    pub fn resolve(&self) -> (u64, u64) {
        (
            self.page.unwrap_or(1).max(1),
            self.per_page.unwrap_or(20).clamp(1, 100),
        )
    }
}

/// Validate a trimmed name (1-`max` Unicode characters) and return it trimmed.
pub fn validate_name(value: &str, field: &str, max: usize) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Validate a maximum-score field (finite and > 0).
pub fn validate_max_score(score: f64, field: &str) -> Result<(), AppError> {
    if !score.is_finite() || score <= 0.0 {
        return Err(AppError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

/// Validate an ID list for bulk operations (non-empty, no duplicates, max length).
pub fn validate_bulk_ids(ids: &[i32], name: &str, max: usize) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }
    if ids.len() > max {
        return Err(AppError::Validation(format!("Too many {name}: max {max}")));
    }
    let mut seen = HashSet::new();
    for &id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Duplicate {name} ID: {id}")));
        }
    }
    Ok(())
}
