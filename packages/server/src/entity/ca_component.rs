use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A sub-assessment of a CA-type marking-scheme component (e.g. "Test 1").
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "continuous_assessment_component")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique_key = "component_sub_name")]
    pub component_id: i32,
    #[sea_orm(belongs_to, from = "component_id", to = "id")]
    pub component: HasOne<super::marking_scheme_component::Entity>,

    #[sea_orm(unique_key = "component_sub_name")]
    pub name: String,

    /// Maximum points for this sub-component.
    pub score: f64,

    #[sea_orm(default_value = 0)]
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
