use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One student's raw points for one component (or CA sub-component) of one subject.
///
/// At most one row exists per (student, subject, session, term, component,
/// sub-component). Rows without a sub-component are additionally covered by a
/// partial unique index created in `seed::ensure_indexes`, since NULLs never
/// collide in a plain unique key.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "score")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub school_id: i32,

    #[sea_orm(unique_key = "score_coordinate")]
    pub session_id: i32,
    #[sea_orm(belongs_to, from = "session_id", to = "id")]
    pub session: HasOne<super::academic_session::Entity>,

    #[sea_orm(unique_key = "score_coordinate")]
    pub term_id: i32,
    #[sea_orm(belongs_to, from = "term_id", to = "id")]
    pub term: HasOne<super::term::Entity>,

    pub class_id: i32,

    #[sea_orm(indexed)]
    pub class_arm_id: i32,
    #[sea_orm(belongs_to, from = "class_arm_id", to = "id")]
    pub class_arm: HasOne<super::class_arm::Entity>,

    #[sea_orm(unique_key = "score_coordinate")]
    pub subject_id: i32,
    #[sea_orm(belongs_to, from = "subject_id", to = "id")]
    pub subject: HasOne<super::subject::Entity>,

    #[sea_orm(unique_key = "score_coordinate")]
    pub student_id: i32,
    #[sea_orm(belongs_to, from = "student_id", to = "id")]
    pub student: HasOne<super::student::Entity>,

    #[sea_orm(unique_key = "score_coordinate")]
    pub component_id: i32,
    #[sea_orm(belongs_to, from = "component_id", to = "id")]
    pub component: HasOne<super::marking_scheme_component::Entity>,

    #[sea_orm(unique_key = "score_coordinate")]
    pub ca_component_id: Option<i32>,
    #[sea_orm(belongs_to, from = "ca_component_id", to = "id")]
    pub ca_component: HasOne<super::ca_component::Entity>,

    pub score: f64,

    pub recorded_by: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
