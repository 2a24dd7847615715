use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A subject offered by a class. Every arm of the class takes it.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class_subject")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub class_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "class_id", to = "id")]
    pub class: HasOne<super::school_class::Entity>,
    #[sea_orm(belongs_to, from = "subject_id", to = "id")]
    pub subject: HasOne<super::subject::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
