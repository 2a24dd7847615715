use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grading_system")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "school_grading_system_name")]
    pub school_id: i32,
    #[sea_orm(belongs_to, from = "school_id", to = "id")]
    pub school: HasOne<super::school::Entity>,

    #[sea_orm(unique_key = "school_grading_system_name")]
    pub name: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
