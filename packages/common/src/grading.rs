use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A closed score interval `[score_start_point, score_end_point]` mapped to a grade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    /// Database id of the band, when it has been persisted.
    pub id: Option<i32>,
    pub grade: String,
    pub score_start_point: f64,
    pub score_end_point: f64,
    pub remark: String,
}

impl GradeBand {
    /// Both ends are inclusive.
    pub fn contains(&self, score: f64) -> bool {
        score >= self.score_start_point && score <= self.score_end_point
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GradingError {
    #[error("A grading system needs at least one band")]
    Empty,

    #[error("Band '{grade}' has a negative bound")]
    Negative { grade: String },

    #[error("Band '{grade}' starts after it ends")]
    Inverted { grade: String },

    #[error("Bands '{first}' and '{second}' overlap")]
    Overlap { first: String, second: String },

    #[error("Grade label '{0}' is used more than once")]
    DuplicateGrade(String),
}

/// Check that a set of bands is well-formed: every band is a non-negative,
/// non-inverted interval, labels are unique and no two intervals share a point.
pub fn validate_bands(bands: &[GradeBand]) -> Result<(), GradingError> {
    if bands.is_empty() {
        return Err(GradingError::Empty);
    }

    let mut seen = std::collections::HashSet::new();
    for band in bands {
        if band.score_start_point < 0.0 || band.score_end_point < 0.0 {
            return Err(GradingError::Negative {
                grade: band.grade.clone(),
            });
        }
        if band.score_start_point > band.score_end_point {
            return Err(GradingError::Inverted {
                grade: band.grade.clone(),
            });
        }
        if !seen.insert(band.grade.as_str()) {
            return Err(GradingError::DuplicateGrade(band.grade.clone()));
        }
    }

    let mut sorted: Vec<&GradeBand> = bands.iter().collect();
    sorted.sort_by(|a, b| a.score_start_point.total_cmp(&b.score_start_point));
    for pair in sorted.windows(2) {
        // Inclusive ends: touching bounds (e.g. 49 and 49) count as overlap.
        if pair[1].score_start_point <= pair[0].score_end_point {
            return Err(GradingError::Overlap {
                first: pair[0].grade.clone(),
                second: pair[1].grade.clone(),
            });
        }
    }

    Ok(())
}

/// Grade bands of one grading system, highest band first.
#[derive(Clone, Debug, Default)]
pub struct GradeScale {
    bands: Vec<GradeBand>,
}

impl GradeScale {
    pub fn new(mut bands: Vec<GradeBand>) -> Self {
        bands.sort_by(|a, b| b.score_start_point.total_cmp(&a.score_start_point));
        Self { bands }
    }

    /// A scale with no bands; every lookup resolves to `None`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bands(&self) -> &[GradeBand] {
        &self.bands
    }

    /// Return the first band (scanning from the highest) that contains `score`.
    pub fn resolve(&self, score: f64) -> Option<&GradeBand> {
        self.bands.iter().find(|band| band.contains(score))
    }
}
