use common::AssessmentScope;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One result computation run for a class arm, term and scope.
///
/// `content_hash` is derived from the defining tuple (school, session, term,
/// class, arm, scope, result type) so recomputation finds and updates the same
/// row instead of inserting a new one.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "result_batch")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub school_id: i32,

    pub session_id: i32,
    #[sea_orm(belongs_to, from = "session_id", to = "id")]
    pub session: HasOne<super::academic_session::Entity>,

    pub term_id: i32,
    #[sea_orm(belongs_to, from = "term_id", to = "id")]
    pub term: HasOne<super::term::Entity>,

    #[sea_orm(indexed)]
    pub class_id: i32,
    #[sea_orm(belongs_to, from = "class_id", to = "id")]
    pub class: HasOne<super::school_class::Entity>,

    pub class_arm_id: i32,
    #[sea_orm(belongs_to, from = "class_arm_id", to = "id")]
    pub class_arm: HasOne<super::class_arm::Entity>,

    pub scope: AssessmentScope,
    /// Component id a CA-scoped batch was narrowed to.
    pub result_type_id: Option<i32>,

    pub title: String,

    #[sea_orm(unique)]
    pub content_hash: String,

    /// Snapshot of the resolved layout at computation time.
    #[sea_orm(column_type = "JsonBinary")]
    pub marking_scheme_structure: serde_json::Value,

    pub total_students: i32,
    pub total_subjects: i32,
    pub students_processed: i32,
    pub class_average: f64,

    #[sea_orm(default_value = false)]
    pub is_approved: bool,
    pub approved_by: Option<i32>,
    pub approved_at: Option<DateTimeUtc>,

    pub created_by: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
