use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use common::{AssessmentScope, ContentHash, GradeBand, GradeScale, RankingPolicy, assign_positions};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Expr, LockType, OnConflict},
};
use serde::Serialize;
use tracing::{info, warn};

use super::aggregate::{
    ComputedResult, ScoreSheet, aggregate_subject, class_average, rank_by_subject, resolve_grades,
    round2,
};
use super::layout::{MarkingSchemeLayout, resolve_layout};
use super::ResultError;
use crate::config::{MissingScorePolicy, ResultsConfig};
use crate::entity::{
    academic_session, class_arm, class_subject, grade_band, grading_system_class, result_batch,
    school_class, score, student, student_result, term,
};

/// Rows per `INSERT` when upserting student results.
const UPSERT_CHUNK: usize = 500;

/// The defining tuple of a result batch, already validated against the school.
#[derive(Debug, Clone)]
pub struct BatchTarget {
    pub school_id: i32,
    pub session: academic_session::Model,
    pub term: term::Model,
    pub class: school_class::Model,
    pub arm: class_arm::Model,
    pub scope: AssessmentScope,
    pub result_type_id: Option<i32>,
}

impl BatchTarget {
    /// Deterministic hash locating the batch row for this tuple.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of_fields(&[
            ("school", self.school_id.to_string()),
            ("session", self.session.id.to_string()),
            ("term", self.term.id.to_string()),
            ("class", self.class.id.to_string()),
            ("class_arm", self.arm.id.to_string()),
            ("scope", self.scope.to_string()),
            ("result_type", self.result_type_key()),
        ])
    }

    /// Only CA batches are keyed by result type.
    fn result_type_key(&self) -> String {
        match self.scope {
            AssessmentScope::Ca => self.result_type_id.map(|id| id.to_string()).unwrap_or_default(),
            AssessmentScope::Exam => String::new(),
        }
    }

    /// e.g. `JSS1 A - First Term 2024/2025 - EXAM` or `... - CA (First CA)`.
    pub fn title(&self, layout: &MarkingSchemeLayout) -> String {
        let base = format!(
            "{} {} - {} {}",
            self.class.name, self.arm.name, self.term.name, self.session.name
        );
        match self.scope {
            AssessmentScope::Exam => format!("{base} - EXAM"),
            AssessmentScope::Ca => {
                let component = layout
                    .components
                    .first()
                    .map(|c| c.name.as_str())
                    .unwrap_or_default();
                format!("{base} - CA ({component})")
            }
        }
    }
}

/// Summary of one computation run.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ComputeOutcome {
    #[schema(example = 1)]
    pub batch_id: i32,
    #[schema(example = "JSS1 A - First Term 2024/2025 - EXAM")]
    pub title: String,
    #[schema(example = 2)]
    pub total_students: i32,
    #[schema(example = 1)]
    pub total_subjects: i32,
    #[schema(example = 75.0)]
    pub class_average: f64,
    #[schema(example = 2)]
    pub students_processed: i32,
    pub marking_scheme_structure: MarkingSchemeLayout,
}

/// Filters for listing batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchFilter {
    pub session_id: Option<i32>,
    pub term_id: Option<i32>,
    pub class_id: Option<i32>,
}

/// One student's rows within a batch plus their standing in the arm.
#[derive(Debug, Clone)]
pub struct StudentReport {
    pub batch: result_batch::Model,
    pub student: student::Model,
    pub rows: Vec<student_result::Model>,
    pub overall_total: f64,
    pub average: f64,
    /// Position by overall total among the students in the batch.
    pub overall_position: Option<u32>,
    pub class_size: usize,
}

pub struct ResultService<'a, C: ConnectionTrait> {
    conn: &'a C,
    ranking: RankingPolicy,
    missing_scores: MissingScorePolicy,
}

impl<'a, C: ConnectionTrait> ResultService<'a, C> {
    pub fn new(conn: &'a C, config: &ResultsConfig) -> Self {
        Self {
            conn,
            ranking: config.ranking_policy,
            missing_scores: config.missing_scores,
        }
    }

    /// Compute (or recompute) the batch for `target`.
    ///
    /// Must run inside a transaction: the batch row is locked for the rest of
    /// the run and a failure at any step leaves nothing persisted.
    pub async fn compute(
        &self,
        target: &BatchTarget,
        actor_id: i32,
    ) -> Result<ComputeOutcome, ResultError> {
        let layout = resolve_layout(
            self.conn,
            target.school_id,
            target.class.id,
            target.term.id,
            target.scope,
            target.result_type_id,
        )
        .await?;
        let structure = serde_json::to_value(&layout)?;
        let title = target.title(&layout);

        let batch = self
            .lock_or_create_batch(target, &title, &structure, actor_id)
            .await?;
        if batch.is_approved {
            return Err(ResultError::AlreadyApproved(batch.id));
        }

        let students = student::Entity::find()
            .filter(student::Column::SchoolId.eq(target.school_id))
            .filter(student::Column::ClassArmId.eq(target.arm.id))
            .order_by_asc(student::Column::Id)
            .all(self.conn)
            .await?;
        let student_ids: Vec<i32> = students.iter().map(|s| s.id).collect();

        let subject_ids: Vec<i32> = class_subject::Entity::find()
            .filter(class_subject::Column::ClassId.eq(target.class.id))
            .order_by_asc(class_subject::Column::SubjectId)
            .all(self.conn)
            .await?
            .into_iter()
            .map(|cs| cs.subject_id)
            .collect();

        let sheet = self.load_sheet(target, &layout, &student_ids).await?;
        let scale = load_grade_scale(self.conn, target.class.id).await?;

        let mut results: Vec<ComputedResult> =
            Vec::with_capacity(student_ids.len() * subject_ids.len());
        for &student_id in &student_ids {
            for &subject_id in &subject_ids {
                results.push(aggregate_subject(&layout, &sheet, student_id, subject_id));
            }
        }

        let missing: usize = results.iter().map(|r| r.missing).sum();
        if missing > 0 {
            match self.missing_scores {
                MissingScorePolicy::Reject => {
                    return Err(ResultError::IncompleteScores { missing });
                }
                MissingScorePolicy::Zero => {
                    warn!(batch_id = batch.id, missing, "Missing scores counted as zero");
                }
            }
        }

        resolve_grades(&mut results, &scale);
        rank_by_subject(&mut results, self.ranking);

        self.write_results(batch.id, &results).await?;
        self.delete_stale(batch.id, &student_ids, &subject_ids).await?;

        let average = class_average(&results);
        let processed = results
            .iter()
            .map(|r| r.student_id)
            .collect::<BTreeSet<_>>()
            .len() as i32;

        let mut active: result_batch::ActiveModel = batch.into();
        active.title = Set(title.clone());
        active.marking_scheme_structure = Set(structure);
        active.total_students = Set(student_ids.len() as i32);
        active.total_subjects = Set(subject_ids.len() as i32);
        active.students_processed = Set(processed);
        active.class_average = Set(average);
        active.updated_at = Set(Utc::now());
        let batch = active.update(self.conn).await?;

        info!(
            batch_id = batch.id,
            students = batch.total_students,
            subjects = batch.total_subjects,
            class_average = batch.class_average,
            ranking = %self.ranking,
            "Result batch computed"
        );

        Ok(ComputeOutcome {
            batch_id: batch.id,
            title,
            total_students: batch.total_students,
            total_subjects: batch.total_subjects,
            class_average: batch.class_average,
            students_processed: batch.students_processed,
            marking_scheme_structure: layout,
        })
    }

    /// Insert the batch row if absent, then lock it.
    ///
    /// A concurrent insert that loses the unique race falls through to the
    /// locked re-read and sees the winner's row.
    async fn lock_or_create_batch(
        &self,
        target: &BatchTarget,
        title: &str,
        structure: &serde_json::Value,
        actor_id: i32,
    ) -> Result<result_batch::Model, ResultError> {
        let hash = target.content_hash().to_hex();
        let now = Utc::now();

        let model = result_batch::ActiveModel {
            school_id: Set(target.school_id),
            session_id: Set(target.session.id),
            term_id: Set(target.term.id),
            class_id: Set(target.class.id),
            class_arm_id: Set(target.arm.id),
            scope: Set(target.scope),
            result_type_id: Set(match target.scope {
                AssessmentScope::Ca => target.result_type_id,
                AssessmentScope::Exam => None,
            }),
            title: Set(title.to_string()),
            content_hash: Set(hash.clone()),
            marking_scheme_structure: Set(structure.clone()),
            total_students: Set(0),
            total_subjects: Set(0),
            students_processed: Set(0),
            class_average: Set(0.0),
            is_approved: Set(false),
            approved_by: Set(None),
            approved_at: Set(None),
            created_by: Set(actor_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let inserted = result_batch::Entity::insert(model)
            .on_conflict(
                OnConflict::column(result_batch::Column::ContentHash)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await;
        match inserted {
            Ok(_) | Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e.into()),
        }

        result_batch::Entity::find()
            .filter(result_batch::Column::ContentHash.eq(&hash))
            .lock(LockType::Update)
            .one(self.conn)
            .await?
            .ok_or_else(|| {
                ResultError::Database(DbErr::Custom(
                    "result batch missing after upsert".to_string(),
                ))
            })
    }

    async fn load_sheet(
        &self,
        target: &BatchTarget,
        layout: &MarkingSchemeLayout,
        student_ids: &[i32],
    ) -> Result<ScoreSheet, DbErr> {
        let mut sheet = ScoreSheet::new();
        if student_ids.is_empty() || layout.components.is_empty() {
            return Ok(sheet);
        }

        let component_ids: Vec<i32> = layout.components.iter().map(|c| c.id).collect();
        let rows = score::Entity::find()
            .filter(score::Column::SchoolId.eq(target.school_id))
            .filter(score::Column::SessionId.eq(target.session.id))
            .filter(score::Column::TermId.eq(target.term.id))
            .filter(score::Column::StudentId.is_in(student_ids.iter().copied()))
            .filter(score::Column::ComponentId.is_in(component_ids))
            .all(self.conn)
            .await?;

        for row in rows {
            sheet.insert(
                row.student_id,
                row.subject_id,
                row.component_id,
                row.ca_component_id,
                row.score,
            );
        }
        Ok(sheet)
    }

    async fn write_results(
        &self,
        batch_id: i32,
        results: &[ComputedResult],
    ) -> Result<(), ResultError> {
        let now = Utc::now();
        for chunk in results.chunks(UPSERT_CHUNK) {
            let models = chunk
                .iter()
                .map(|r| {
                    Ok(student_result::ActiveModel {
                        result_batch_id: Set(batch_id),
                        student_id: Set(r.student_id),
                        subject_id: Set(r.subject_id),
                        total_score: Set(r.total),
                        breakdown: Set(serde_json::to_value(&r.breakdown)?),
                        grade_band_id: Set(r.grade.as_ref().and_then(|g| g.id)),
                        grade: Set(r.grade.as_ref().map(|g| g.grade.clone())),
                        remark: Set(r.grade.as_ref().map(|g| g.remark.clone())),
                        position: Set(r.position as i32),
                        updated_at: Set(now),
                        ..Default::default()
                    })
                })
                .collect::<Result<Vec<_>, ResultError>>()?;

            student_result::Entity::insert_many(models)
                .on_conflict(
                    OnConflict::columns([
                        student_result::Column::ResultBatchId,
                        student_result::Column::StudentId,
                        student_result::Column::SubjectId,
                    ])
                    .update_columns([
                        student_result::Column::TotalScore,
                        student_result::Column::Breakdown,
                        student_result::Column::GradeBandId,
                        student_result::Column::Grade,
                        student_result::Column::Remark,
                        student_result::Column::Position,
                        student_result::Column::UpdatedAt,
                    ])
                    .to_owned(),
                )
                .exec_without_returning(self.conn)
                .await?;
        }
        Ok(())
    }

    /// Drop rows whose student left the arm or whose subject the class no longer offers.
    async fn delete_stale(
        &self,
        batch_id: i32,
        student_ids: &[i32],
        subject_ids: &[i32],
    ) -> Result<(), DbErr> {
        let mut query = student_result::Entity::delete_many()
            .filter(student_result::Column::ResultBatchId.eq(batch_id));
        if !student_ids.is_empty() && !subject_ids.is_empty() {
            query = query.filter(
                Condition::any()
                    .add(student_result::Column::StudentId.is_not_in(student_ids.iter().copied()))
                    .add(student_result::Column::SubjectId.is_not_in(subject_ids.iter().copied())),
            );
        }

        let deleted = query.exec(self.conn).await?.rows_affected;
        if deleted > 0 {
            info!(batch_id, deleted, "Removed stale student results");
        }
        Ok(())
    }

    /// Approve a batch. One-way: approving twice is `AlreadyApproved`.
    pub async fn approve(
        &self,
        school_id: i32,
        batch_id: i32,
        actor_id: i32,
    ) -> Result<result_batch::Model, ResultError> {
        let now = Utc::now();
        let update = result_batch::Entity::update_many()
            .col_expr(result_batch::Column::IsApproved, Expr::value(true))
            .col_expr(result_batch::Column::ApprovedBy, Expr::value(Some(actor_id)))
            .col_expr(result_batch::Column::ApprovedAt, Expr::value(now))
            .col_expr(result_batch::Column::UpdatedAt, Expr::value(now))
            .filter(result_batch::Column::Id.eq(batch_id))
            .filter(result_batch::Column::SchoolId.eq(school_id))
            .filter(result_batch::Column::IsApproved.eq(false))
            .exec(self.conn)
            .await?;

        let batch = self.get_batch(school_id, batch_id).await?;
        if update.rows_affected == 0 {
            return Err(ResultError::AlreadyApproved(batch.id));
        }

        info!(batch_id, approved_by = actor_id, "Result batch approved");
        Ok(batch)
    }

    pub async fn get_batch(
        &self,
        school_id: i32,
        batch_id: i32,
    ) -> Result<result_batch::Model, ResultError> {
        result_batch::Entity::find_by_id(batch_id)
            .filter(result_batch::Column::SchoolId.eq(school_id))
            .one(self.conn)
            .await?
            .ok_or_else(|| ResultError::NotFound("Result batch not found".into()))
    }

    /// List a school's batches, newest first.
    pub async fn list_batches(
        &self,
        school_id: i32,
        filter: BatchFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<result_batch::Model>, u64), DbErr> {
        let mut query =
            result_batch::Entity::find().filter(result_batch::Column::SchoolId.eq(school_id));
        if let Some(session_id) = filter.session_id {
            query = query.filter(result_batch::Column::SessionId.eq(session_id));
        }
        if let Some(term_id) = filter.term_id {
            query = query.filter(result_batch::Column::TermId.eq(term_id));
        }
        if let Some(class_id) = filter.class_id {
            query = query.filter(result_batch::Column::ClassId.eq(class_id));
        }

        let total = query.clone().count(self.conn).await?;
        let batches = query
            .order_by_desc(result_batch::Column::UpdatedAt)
            .order_by_desc(result_batch::Column::Id)
            .offset(page.saturating_sub(1) * per_page)
            .limit(per_page)
            .all(self.conn)
            .await?;

        Ok((batches, total))
    }

    /// All rows of a batch, grouped by subject and ordered by position.
    pub async fn batch_results(
        &self,
        batch_id: i32,
    ) -> Result<Vec<student_result::Model>, DbErr> {
        student_result::Entity::find()
            .filter(student_result::Column::ResultBatchId.eq(batch_id))
            .order_by_asc(student_result::Column::SubjectId)
            .order_by_asc(student_result::Column::Position)
            .order_by_asc(student_result::Column::StudentId)
            .all(self.conn)
            .await
    }

    /// Report card for one student within a batch.
    pub async fn student_report(
        &self,
        school_id: i32,
        batch_id: i32,
        student_id: i32,
    ) -> Result<StudentReport, ResultError> {
        let batch = self.get_batch(school_id, batch_id).await?;
        let student = student::Entity::find_by_id(student_id)
            .filter(student::Column::SchoolId.eq(school_id))
            .one(self.conn)
            .await?
            .ok_or_else(|| ResultError::NotFound("Student not found".into()))?;

        let all_rows = self.batch_results(batch.id).await?;

        let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
        for row in &all_rows {
            *totals.entry(row.student_id).or_default() += row.total_score;
        }
        if !totals.contains_key(&student.id) {
            return Err(ResultError::NotFound(
                "Student has no results in this batch".into(),
            ));
        }

        let ranked: Vec<(i32, f64)> = totals.into_iter().collect();
        let overall: Vec<f64> = ranked.iter().map(|&(_, total)| total).collect();
        let positions = assign_positions(&overall, self.ranking);
        let overall_position = ranked
            .iter()
            .zip(positions)
            .find(|((id, _), _)| *id == student.id)
            .map(|(_, position)| position);

        let rows: Vec<student_result::Model> = all_rows
            .into_iter()
            .filter(|r| r.student_id == student.id)
            .collect();
        let overall_total = round2(rows.iter().map(|r| r.total_score).sum());
        let average = round2(overall_total / rows.len() as f64);

        Ok(StudentReport {
            batch,
            student,
            class_size: ranked.len(),
            rows,
            overall_total,
            average,
            overall_position,
        })
    }
}

/// Grade bands of the class's grading system, or an empty scale.
pub(crate) async fn load_grade_scale<C: ConnectionTrait>(
    conn: &C,
    class_id: i32,
) -> Result<GradeScale, DbErr> {
    let Some(assignment) = grading_system_class::Entity::find_by_id(class_id)
        .one(conn)
        .await?
    else {
        return Ok(GradeScale::empty());
    };

    let bands = grade_band::Entity::find()
        .filter(grade_band::Column::GradingSystemId.eq(assignment.grading_system_id))
        .all(conn)
        .await?;
    Ok(GradeScale::new(bands.into_iter().map(GradeBand::from).collect()))
}

/// Create a `ResultService` over the pool.
pub fn result_service<'a>(
    db: &'a DatabaseConnection,
    config: &ResultsConfig,
) -> ResultService<'a, DatabaseConnection> {
    ResultService::new(db, config)
}
