use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{role, role_permission, score, student, student_result};

/// Default roles seeded on startup.
const DEFAULT_ROLES: &[&str] = &["admin", "principal", "teacher"];

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "user:manage"),
    ("admin", "academic:manage"),
    ("admin", "academic:view"),
    ("admin", "marking_scheme:manage"),
    ("admin", "grading:manage"),
    ("admin", "score:enter"),
    ("admin", "score:view"),
    ("admin", "result:view"),
    ("admin", "result:compute"),
    ("admin", "result:approve"),
    // Principal
    ("principal", "academic:view"),
    ("principal", "score:view"),
    ("principal", "result:view"),
    ("principal", "result:compute"),
    ("principal", "result:approve"),
    // Teacher
    ("teacher", "academic:view"),
    ("teacher", "score:enter"),
    ("teacher", "score:view"),
    ("teacher", "result:view"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let mut roles_inserted = 0u32;
    for &name in DEFAULT_ROLES {
        let model = role::ActiveModel {
            name: Set(name.to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(OnConflict::column(role::Column::Name).do_nothing().to_owned())
            .exec_without_returning(db)
            .await;

        match result {
            Ok(0) | Err(DbErr::RecordNotInserted) => {}
            Ok(_) => roles_inserted += 1,
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(0) | Err(DbErr::RecordNotInserted) => {}
            Ok(_) => perms_inserted += 1,
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure indexes the schema sync cannot express.
///
/// The partial unique index on component-level scores is required for
/// correctness and its failure aborts startup. The lookup indexes are best
/// effort.
pub async fn ensure_indexes<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    // NULL sub-components never collide in the composite score key.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_score_component_level \
         ON score (session_id, term_id, subject_id, student_id, component_id) \
         WHERE ca_component_id IS NULL",
    )
    .await?;
    info!("Ensured index uq_score_component_level exists");

    // Score sheet and aggregation reads.
    let score_sheet = Index::create()
        .if_not_exists()
        .name("idx_score_sheet")
        .table(score::Entity)
        .col(score::Column::SchoolId)
        .col(score::Column::SessionId)
        .col(score::Column::TermId)
        .col(score::Column::ClassArmId)
        .col(score::Column::SubjectId)
        .to_string(PostgresQueryBuilder);

    // Broadsheet ordering.
    let broadsheet = Index::create()
        .if_not_exists()
        .name("idx_student_result_batch_subject_position")
        .table(student_result::Entity)
        .col(student_result::Column::ResultBatchId)
        .col(student_result::Column::SubjectId)
        .col(student_result::Column::Position)
        .to_string(PostgresQueryBuilder);

    // Students of an arm.
    let arm_roster = Index::create()
        .if_not_exists()
        .name("idx_student_school_arm")
        .table(student::Entity)
        .col(student::Column::SchoolId)
        .col(student::Column::ClassArmId)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_score_sheet", score_sheet),
        ("idx_student_result_batch_subject_position", broadsheet),
        ("idx_student_school_arm", arm_roster),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {} exists", name),
            Err(e) => tracing::warn!("Failed to create index {}: {}", name, e),
        }
    }

    Ok(())
}
