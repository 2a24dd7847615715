//! Result computation: marking-scheme layout resolution, score aggregation,
//! grade resolution, per-subject ranking and result-batch orchestration.

pub mod aggregate;
pub mod error;
pub mod layout;
pub mod service;

pub use error::ResultError;
pub use layout::{MarkingSchemeLayout, resolve_layout};
pub use service::{
    BatchFilter, BatchTarget, ComputeOutcome, ResultService, StudentReport, result_service,
};
