use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A class level such as "JSS1". Students sit in one of its arms.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "school_class_name")]
    pub school_id: i32,
    #[sea_orm(belongs_to, from = "school_id", to = "id")]
    pub school: HasOne<super::school::Entity>,

    #[sea_orm(unique_key = "school_class_name")]
    pub name: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
