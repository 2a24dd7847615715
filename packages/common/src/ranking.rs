use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Totals closer than this are treated as a tie.
pub const TIE_TOLERANCE: f64 = 1e-9;

/// How equal totals are turned into positions.
///
/// For totals `[90, 80, 80, 70]`:
/// * `Ordinal`     => `[1, 2, 3, 4]`
/// * `Competition` => `[1, 2, 2, 4]`
/// * `Dense`       => `[1, 2, 2, 3]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// Position is the sorted index + 1; ties keep their input order.
    Ordinal,
    /// Tied totals share a position and the next position skips ahead.
    #[default]
    Competition,
    /// Tied totals share a position and the next position follows directly.
    Dense,
}

impl RankingPolicy {
    pub const ALL: &'static [RankingPolicy] = &[Self::Ordinal, Self::Competition, Self::Dense];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordinal => "ordinal",
            Self::Competition => "competition",
            Self::Dense => "dense",
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ordinal" => Ok(Self::Ordinal),
            "competition" => Ok(Self::Competition),
            "dense" => Ok(Self::Dense),
            _ => Err(format!(
                "Invalid ranking policy '{s}'. Valid values: {}",
                Self::ALL
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Assign a 1-based position to every total.
///
/// The returned vector is parallel to `totals`. Sorting is stable, so under
/// [`RankingPolicy::Ordinal`] tied totals are ordered by their input index.
pub fn assign_positions(totals: &[f64], policy: RankingPolicy) -> Vec<u32> {
    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|&a, &b| totals[b].total_cmp(&totals[a]));

    let mut positions = vec![0u32; totals.len()];
    let mut previous: Option<f64> = None;
    let mut current = 0u32;

    for (index, &slot) in order.iter().enumerate() {
        let total = totals[slot];
        let tied = previous.is_some_and(|p| (p - total).abs() <= TIE_TOLERANCE);

        current = match policy {
            RankingPolicy::Ordinal => index as u32 + 1,
            RankingPolicy::Competition if tied => current,
            RankingPolicy::Competition => index as u32 + 1,
            RankingPolicy::Dense if tied => current,
            RankingPolicy::Dense => current + 1,
        };

        positions[slot] = current;
        previous = Some(total);
    }

    positions
}
