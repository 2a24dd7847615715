#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which part of a marking scheme a result computation covers.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum AssessmentScope {
    /// A single continuous-assessment component (mid-term style result).
    #[serde(rename = "CA")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CA"))]
    Ca,
    /// Every component of the scheme (terminal result).
    #[serde(rename = "EXAM")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "EXAM"))]
    Exam,
}

impl AssessmentScope {
    pub const ALL: &'static [AssessmentScope] = &[Self::Ca, Self::Exam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ca => "CA",
            Self::Exam => "EXAM",
        }
    }
}

impl fmt::Display for AssessmentScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a marking-scheme component.
///
/// Only `Ca` components may be split into sub-components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
pub enum ComponentType {
    #[serde(rename = "EXAM")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "EXAM"))]
    Exam,
    #[serde(rename = "CA")]
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "CA"))]
    Ca,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exam => "EXAM",
            Self::Ca => "CA",
        }
    }

    /// Returns true if components of this type may own sub-components.
    pub fn allows_sub_components(&self) -> bool {
        matches!(self, Self::Ca)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid scope string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseScopeError {
    invalid: String,
}

impl fmt::Display for ParseScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid scope '{}'. Valid values: {}",
            self.invalid,
            AssessmentScope::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseScopeError {}

impl FromStr for AssessmentScope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CA" => Ok(Self::Ca),
            "EXAM" => Ok(Self::Exam),
            _ => Err(ParseScopeError {
                invalid: s.to_string(),
            }),
        }
    }
}
