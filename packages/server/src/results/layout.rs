use std::collections::HashMap;

use common::{AssessmentScope, ComponentType};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};

use super::ResultError;
use crate::entity::{ca_component, marking_scheme, marking_scheme_assignment, marking_scheme_component};

/// A CA sub-component (e.g. "Test 1") within a layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LayoutSubComponent {
    #[schema(example = 12)]
    pub id: i32,
    #[schema(example = "Test 1")]
    pub name: String,
    #[schema(example = 20.0)]
    pub max_score: f64,
}

/// A scored component of the marking scheme.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LayoutComponent {
    #[schema(example = 4)]
    pub id: i32,
    #[schema(example = "CA")]
    pub name: String,
    pub component_type: ComponentType,
    #[schema(example = 40.0)]
    pub max_score: f64,
    pub sub_components: Vec<LayoutSubComponent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    SubComponent,
    Component,
    Total,
    Grade,
}

/// One column of the tabular result layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LayoutColumn {
    /// Stable key: `c{component}`, `c{component}_s{sub}`, `total` or `grade`.
    #[schema(example = "c4_s12")]
    pub key: String,
    #[schema(example = "Test 1")]
    pub header: String,
    pub kind: ColumnKind,
    /// Declared maximum of the coordinate; absent for the grade column.
    /// A component's subtotal carries the component's own maximum even when
    /// its sub-component maxima add up to less.
    pub max_score: Option<f64>,
}

/// The resolved shape of a result computation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MarkingSchemeLayout {
    #[schema(example = 1)]
    pub marking_scheme_id: i32,
    #[schema(example = "Junior secondary")]
    pub marking_scheme_name: String,
    pub scope: AssessmentScope,
    pub result_type_id: Option<i32>,
    /// Sum of the included components' maxima.
    #[schema(example = 140.0)]
    pub total_score: f64,
    pub components: Vec<LayoutComponent>,
    pub columns: Vec<LayoutColumn>,
}

/// Narrow `components` to `scope` and derive the column list.
///
/// `components` must already be in display order.
pub fn build_layout(
    marking_scheme_id: i32,
    marking_scheme_name: &str,
    components: Vec<LayoutComponent>,
    scope: AssessmentScope,
    result_type_id: Option<i32>,
) -> Result<MarkingSchemeLayout, ResultError> {
    let components = match scope {
        AssessmentScope::Exam => components,
        AssessmentScope::Ca => {
            let Some(result_type_id) = result_type_id else {
                return Err(ResultError::Validation(
                    "result_type_id is required for CA results".into(),
                ));
            };
            let selected: Vec<LayoutComponent> = components
                .into_iter()
                .filter(|c| c.id == result_type_id)
                .collect();
            if selected.is_empty() {
                return Err(ResultError::NotFound(
                    "Result type is not a component of the assigned marking scheme".into(),
                ));
            }
            selected
        }
    };

    let mut columns = Vec::new();
    for component in &components {
        for sub in &component.sub_components {
            columns.push(LayoutColumn {
                key: format!("c{}_s{}", component.id, sub.id),
                header: sub.name.clone(),
                kind: ColumnKind::SubComponent,
                max_score: Some(sub.max_score),
            });
        }
        columns.push(LayoutColumn {
            key: format!("c{}", component.id),
            header: component.name.clone(),
            kind: ColumnKind::Component,
            max_score: Some(component.max_score),
        });
    }

    let total_score: f64 = components.iter().map(|c| c.max_score).sum();
    columns.push(LayoutColumn {
        key: "total".into(),
        header: "Total".into(),
        kind: ColumnKind::Total,
        max_score: Some(total_score),
    });
    columns.push(LayoutColumn {
        key: "grade".into(),
        header: "Grade".into(),
        kind: ColumnKind::Grade,
        max_score: None,
    });

    Ok(MarkingSchemeLayout {
        marking_scheme_id,
        marking_scheme_name: marking_scheme_name.to_string(),
        scope,
        result_type_id: match scope {
            AssessmentScope::Ca => result_type_id,
            AssessmentScope::Exam => None,
        },
        total_score,
        components,
        columns,
    })
}

/// Load a scheme's components with their sub-components, in display order.
pub async fn load_components<C: ConnectionTrait>(
    db: &C,
    marking_scheme_id: i32,
) -> Result<Vec<LayoutComponent>, sea_orm::DbErr> {
    let components = marking_scheme_component::Entity::find()
        .filter(marking_scheme_component::Column::MarkingSchemeId.eq(marking_scheme_id))
        .order_by_asc(marking_scheme_component::Column::Position)
        .order_by_asc(marking_scheme_component::Column::Id)
        .all(db)
        .await?;

    let component_ids: Vec<i32> = components.iter().map(|c| c.id).collect();
    let subs = if component_ids.is_empty() {
        Vec::new()
    } else {
        ca_component::Entity::find()
            .filter(ca_component::Column::ComponentId.is_in(component_ids))
            .order_by_asc(ca_component::Column::Position)
            .order_by_asc(ca_component::Column::Id)
            .all(db)
            .await?
    };

    let mut subs_by_component: HashMap<i32, Vec<LayoutSubComponent>> = HashMap::new();
    for sub in subs {
        subs_by_component
            .entry(sub.component_id)
            .or_default()
            .push(LayoutSubComponent {
                id: sub.id,
                name: sub.name,
                max_score: sub.score,
            });
    }

    Ok(components
        .into_iter()
        .map(|c| LayoutComponent {
            sub_components: subs_by_component.remove(&c.id).unwrap_or_default(),
            id: c.id,
            name: c.name,
            component_type: c.component_type,
            max_score: c.score,
        })
        .collect())
}

/// Resolve the marking scheme assigned to `class_id` for `term_id` and build its layout.
///
/// Fails with `NotFound` when the class has no scheme for the term.
pub async fn resolve_layout<C: ConnectionTrait>(
    db: &C,
    school_id: i32,
    class_id: i32,
    term_id: i32,
    scope: AssessmentScope,
    result_type_id: Option<i32>,
) -> Result<MarkingSchemeLayout, ResultError> {
    let assignment = marking_scheme_assignment::Entity::find()
        .filter(marking_scheme_assignment::Column::SchoolId.eq(school_id))
        .filter(marking_scheme_assignment::Column::ClassId.eq(class_id))
        .filter(marking_scheme_assignment::Column::TermId.eq(term_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            ResultError::NotFound("No marking scheme is assigned to this class for the term".into())
        })?;

    let scheme = marking_scheme::Entity::find_by_id(assignment.marking_scheme_id)
        .one(db)
        .await?
        .ok_or_else(|| ResultError::NotFound("Marking scheme not found".into()))?;

    let components = load_components(db, scheme.id).await?;
    build_layout(scheme.id, &scheme.name, components, scope, result_type_id)
}
