use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Binds a marking scheme to one class for one term.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "marking_scheme_assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub school_id: i32,

    pub marking_scheme_id: i32,
    #[sea_orm(belongs_to, from = "marking_scheme_id", to = "id")]
    pub marking_scheme: HasOne<super::marking_scheme::Entity>,

    #[sea_orm(unique_key = "class_term")]
    pub class_id: i32,
    #[sea_orm(belongs_to, from = "class_id", to = "id")]
    pub class: HasOne<super::school_class::Entity>,

    #[sea_orm(unique_key = "class_term")]
    pub term_id: i32,
    #[sea_orm(belongs_to, from = "term_id", to = "id")]
    pub term: HasOne<super::term::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
