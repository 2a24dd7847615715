use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A class uses at most one grading system.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grading_system_class")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub class_id: i32,
    #[sea_orm(belongs_to, from = "class_id", to = "id")]
    pub class: HasOne<super::school_class::Entity>,

    #[sea_orm(indexed)]
    pub grading_system_id: i32,
    #[sea_orm(belongs_to, from = "grading_system_id", to = "id")]
    pub grading_system: HasOne<super::grading_system::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
