use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "school_admission_number")]
    pub school_id: i32,
    #[sea_orm(belongs_to, from = "school_id", to = "id")]
    pub school: HasOne<super::school::Entity>,

    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique_key = "school_admission_number")]
    pub admission_number: String,

    #[sea_orm(indexed)]
    pub class_id: i32,
    #[sea_orm(belongs_to, from = "class_id", to = "id")]
    pub class: HasOne<super::school_class::Entity>,

    #[sea_orm(indexed)]
    pub class_arm_id: i32,
    #[sea_orm(belongs_to, from = "class_arm_id", to = "id")]
    pub class_arm: HasOne<super::class_arm::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
