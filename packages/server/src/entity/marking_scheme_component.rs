use common::ComponentType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "marking_scheme_component")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "scheme_component_name")]
    pub marking_scheme_id: i32,
    #[sea_orm(belongs_to, from = "marking_scheme_id", to = "id")]
    pub marking_scheme: HasOne<super::marking_scheme::Entity>,

    #[sea_orm(unique_key = "scheme_component_name")]
    pub name: String,

    /// Maximum points for this component.
    pub score: f64,
    pub component_type: ComponentType,

    #[sea_orm(default_value = 0)]
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
