use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Computed aggregate for one student and subject within a batch.
///
/// Written only by the result engine; overwritten on recomputation.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "batch_student_subject")]
    pub result_batch_id: i32,
    #[sea_orm(belongs_to, from = "result_batch_id", to = "id")]
    pub result_batch: HasOne<super::result_batch::Entity>,

    #[sea_orm(unique_key = "batch_student_subject")]
    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,

    #[sea_orm(unique_key = "batch_student_subject")]
    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "subject_id", to = "id")]
    pub subject: HasOne<super::subject::Entity>,

    pub total_score: f64,

    /// Per-component scores as a JSON array of `ComponentScore`.
    #[sea_orm(column_type = "JsonBinary")]
    pub breakdown: serde_json::Value,

    pub grade_band_id: Option<i32>,
    pub grade: Option<String>,
    pub remark: Option<String>,

    pub position: i32,

    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
