pub mod assessment;
pub mod grading;
pub mod hash;
pub mod ranking;

pub use assessment::{AssessmentScope, ComponentType};
pub use grading::{GradeBand, GradeScale, GradingError};
pub use hash::ContentHash;
pub use ranking::{RankingPolicy, assign_positions};
