use chrono::{DateTime, Utc};
use common::AssessmentScope;
use serde::{Deserialize, Serialize};

use super::academic::StudentResponse;
use super::shared::Pagination;
use crate::entity::{result_batch, student_result};
use crate::results::StudentReport;
use crate::results::aggregate::ComponentScore;
use crate::results::layout::MarkingSchemeLayout;

/// Compute (or recompute) the result batch of one class arm.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitResultRequest {
    #[schema(example = 1)]
    pub session_id: i32,
    #[schema(example = 1)]
    pub term_id: i32,
    #[schema(example = 1)]
    pub class_id: i32,
    #[schema(example = 1)]
    pub class_arm_id: i32,
    /// `CA` or `EXAM` (case-insensitive).
    #[schema(example = "EXAM")]
    pub scope: String,
    /// Component id the CA result covers; required when `scope` is `CA`.
    pub result_type_id: Option<i32>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ApproveResultRequest {
    #[schema(example = 1)]
    pub result_batch_id: i32,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct BatchListParams {
    pub session_id: Option<i32>,
    pub term_id: Option<i32>,
    pub class_id: Option<i32>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultBatchResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub session_id: i32,
    pub term_id: i32,
    pub class_id: i32,
    pub class_arm_id: i32,
    pub scope: AssessmentScope,
    pub result_type_id: Option<i32>,
    #[schema(example = "JSS1 A - First Term 2024/2025 - EXAM")]
    pub title: String,
    pub total_students: i32,
    pub total_subjects: i32,
    pub students_processed: i32,
    #[schema(example = 75.0)]
    pub class_average: f64,
    pub is_approved: bool,
    pub approved_by: Option<i32>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<result_batch::Model> for ResultBatchResponse {
    fn from(m: result_batch::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            term_id: m.term_id,
            class_id: m.class_id,
            class_arm_id: m.class_arm_id,
            scope: m.scope,
            result_type_id: m.result_type_id,
            title: m.title,
            total_students: m.total_students,
            total_subjects: m.total_subjects,
            students_processed: m.students_processed,
            class_average: m.class_average,
            is_approved: m.is_approved,
            approved_by: m.approved_by,
            approved_at: m.approved_at,
            created_by: m.created_by,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct BatchListResponse {
    pub data: Vec<ResultBatchResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResultResponse {
    pub student_id: i32,
    pub subject_id: i32,
    #[schema(example = 70.0)]
    pub total_score: f64,
    #[schema(value_type = Vec<ComponentScore>)]
    pub breakdown: serde_json::Value,
    #[schema(example = "B")]
    pub grade: Option<String>,
    #[schema(example = "Very good")]
    pub remark: Option<String>,
    #[schema(example = 2)]
    pub position: i32,
}

impl From<student_result::Model> for StudentResultResponse {
    fn from(m: student_result::Model) -> Self {
        Self {
            student_id: m.student_id,
            subject_id: m.subject_id,
            total_score: m.total_score,
            breakdown: m.breakdown,
            grade: m.grade,
            remark: m.remark,
            position: m.position,
        }
    }
}

/// A batch with every student-subject row.
#[derive(Serialize, utoipa::ToSchema)]
pub struct BroadsheetResponse {
    pub batch: ResultBatchResponse,
    /// Layout snapshot taken when the batch was computed.
    #[schema(value_type = MarkingSchemeLayout)]
    pub marking_scheme_structure: serde_json::Value,
    pub results: Vec<StudentResultResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReportCardResponse {
    pub batch: ResultBatchResponse,
    pub student: StudentResponse,
    pub subjects: Vec<StudentResultResponse>,
    #[schema(example = 412.5)]
    pub overall_total: f64,
    /// Mean total per subject.
    #[schema(example = 68.75)]
    pub average: f64,
    /// Position by overall total among the students in the batch.
    #[schema(example = 3)]
    pub overall_position: Option<u32>,
    #[schema(example = 32)]
    pub class_size: usize,
}

impl From<StudentReport> for ReportCardResponse {
    fn from(report: StudentReport) -> Self {
        Self {
            batch: report.batch.into(),
            student: report.student.into(),
            subjects: report.rows.into_iter().map(Into::into).collect(),
            overall_total: report.overall_total,
            average: report.average,
            overall_position: report.overall_position,
            class_size: report.class_size,
        }
    }
}
