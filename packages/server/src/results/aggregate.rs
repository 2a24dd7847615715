use std::collections::{BTreeMap, HashMap};

use common::{GradeBand, GradeScale, RankingPolicy, assign_positions};
use serde::{Deserialize, Serialize};

use super::layout::MarkingSchemeLayout;

/// Round to two decimal places, the precision totals and averages are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Raw scores of one class arm for one term, keyed by coordinate.
#[derive(Debug, Default)]
pub struct ScoreSheet {
    scores: HashMap<(i32, i32, i32, Option<i32>), f64>,
}

impl ScoreSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        student_id: i32,
        subject_id: i32,
        component_id: i32,
        ca_component_id: Option<i32>,
        score: f64,
    ) {
        self.scores
            .insert((student_id, subject_id, component_id, ca_component_id), score);
    }

    pub fn get(
        &self,
        student_id: i32,
        subject_id: i32,
        component_id: i32,
        ca_component_id: Option<i32>,
    ) -> Option<f64> {
        self.scores
            .get(&(student_id, subject_id, component_id, ca_component_id))
            .copied()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubComponentScore {
    pub sub_component_id: i32,
    pub name: String,
    pub score: f64,
    pub max_score: f64,
}

/// A component's contribution to a student-subject total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ComponentScore {
    pub component_id: i32,
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    pub sub_components: Vec<SubComponentScore>,
}

/// One student's computed result for one subject.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputedResult {
    pub student_id: i32,
    pub subject_id: i32,
    pub total: f64,
    pub breakdown: Vec<ComponentScore>,
    /// Number of layout coordinates that had no score row.
    pub missing: usize,
    pub grade: Option<GradeBand>,
    pub position: u32,
}

/// Sum one student's scores for one subject across the layout.
///
/// Components with sub-components take the sum of their sub-scores; the rest
/// take their own score row. A missing row counts as 0 and is tallied in
/// `missing`.
pub fn aggregate_subject(
    layout: &MarkingSchemeLayout,
    sheet: &ScoreSheet,
    student_id: i32,
    subject_id: i32,
) -> ComputedResult {
    let mut missing = 0usize;
    let mut breakdown = Vec::with_capacity(layout.components.len());

    for component in &layout.components {
        let (score, sub_components) = if component.sub_components.is_empty() {
            let score = sheet
                .get(student_id, subject_id, component.id, None)
                .unwrap_or_else(|| {
                    missing += 1;
                    0.0
                });
            (score, Vec::new())
        } else {
            let subs: Vec<SubComponentScore> = component
                .sub_components
                .iter()
                .map(|sub| SubComponentScore {
                    sub_component_id: sub.id,
                    name: sub.name.clone(),
                    score: sheet
                        .get(student_id, subject_id, component.id, Some(sub.id))
                        .unwrap_or_else(|| {
                            missing += 1;
                            0.0
                        }),
                    max_score: sub.max_score,
                })
                .collect();
            (round2(subs.iter().map(|s| s.score).sum()), subs)
        };

        breakdown.push(ComponentScore {
            component_id: component.id,
            name: component.name.clone(),
            score,
            max_score: component.max_score,
            sub_components,
        });
    }

    ComputedResult {
        student_id,
        subject_id,
        total: round2(breakdown.iter().map(|c| c.score).sum()),
        breakdown,
        missing,
        grade: None,
        position: 0,
    }
}

/// Attach the band containing each result's total, if any.
pub fn resolve_grades(results: &mut [ComputedResult], scale: &GradeScale) {
    for result in results.iter_mut() {
        result.grade = scale.resolve(result.total).cloned();
    }
}

/// Rank results within each subject independently.
///
/// Within a subject, results are considered in student-id order so that
/// ordinal tie-breaking is deterministic across recomputations.
pub fn rank_by_subject(results: &mut [ComputedResult], policy: RankingPolicy) {
    let mut by_subject: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, result) in results.iter().enumerate() {
        by_subject.entry(result.subject_id).or_default().push(index);
    }

    for indices in by_subject.values_mut() {
        indices.sort_by_key(|&i| results[i].student_id);
        let totals: Vec<f64> = indices.iter().map(|&i| results[i].total).collect();
        let positions = assign_positions(&totals, policy);
        for (&index, position) in indices.iter().zip(positions) {
            results[index].position = position;
        }
    }
}

/// Mean of all result totals, or 0 when there are none.
pub fn class_average(results: &[ComputedResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    round2(results.iter().map(|r| r.total).sum::<f64>() / results.len() as f64)
}
