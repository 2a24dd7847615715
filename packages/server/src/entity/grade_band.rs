use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grade_band")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub grading_system_id: i32,
    #[sea_orm(belongs_to, from = "grading_system_id", to = "id")]
    pub grading_system: HasOne<super::grading_system::Entity>,

    pub grade: String,
    pub score_start_point: f64,
    pub score_end_point: f64,
    pub remark: String,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for common::GradeBand {
    fn from(m: Model) -> Self {
        Self {
            id: Some(m.id),
            grade: m.grade,
            score_start_point: m.score_start_point,
            score_end_point: m.score_end_point,
            remark: m.remark,
        }
    }
}
