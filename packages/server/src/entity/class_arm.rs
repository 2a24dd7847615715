use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class_arm")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub school_id: i32,

    #[sea_orm(unique_key = "class_arm_name")]
    pub class_id: i32,
    #[sea_orm(belongs_to, from = "class_id", to = "id")]
    pub class: HasOne<super::school_class::Entity>,

    #[sea_orm(unique_key = "class_arm_name")]
    pub name: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
