use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "marking_scheme")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "school_marking_scheme_name")]
    pub school_id: i32,
    #[sea_orm(belongs_to, from = "school_id", to = "id")]
    pub school: HasOne<super::school::Entity>,

    #[sea_orm(unique_key = "school_marking_scheme_name")]
    pub name: String,

    /// Sum of the component maxima, fixed when the scheme is created.
    pub total_score: f64,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
