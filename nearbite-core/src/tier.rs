//! Distance tiers and the radius ladders that drive progressive search.
//!
//! This is the single home of the 5 km near/far boundary. Providers use
//! [`DistanceTier::admits`] and the search controller uses
//! [`DistanceTier::ladder`]; nobody else hard-codes either value.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Boundary between the near and far tiers, in metres.
pub const TIER_BOUNDARY_M: u32 = 5_000;

/// Search radii tried, in order, for [`DistanceTier::Near`].
pub const NEAR_LADDER_M: [u32; 7] = [500, 1_000, 1_500, 2_000, 3_000, 4_000, 5_000];

/// Search radii tried, in order, for [`DistanceTier::Far`].
pub const FAR_LADDER_M: [u32; 5] = [5_000, 7_000, 10_000, 12_000, 15_000];

/// Coarse distance classification splitting results at [`TIER_BOUNDARY_M`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DistanceTier {
    /// Within 5 km of the origin.
    #[default]
    Near,
    /// Strictly beyond 5 km of the origin.
    Far,
}

impl DistanceTier {
    /// The ascending radius ladder for this tier.
    #[must_use]
    pub const fn ladder(self) -> &'static [u32] {
        match self {
            Self::Near => &NEAR_LADDER_M,
            Self::Far => &FAR_LADDER_M,
        }
    }

    /// The minimum distance floor implied by this tier, if any.
    #[must_use]
    pub const fn min_distance_m(self) -> Option<u32> {
        match self {
            Self::Near => None,
            Self::Far => Some(TIER_BOUNDARY_M),
        }
    }

    /// Whether a candidate `distance_m` from the origin belongs to this tier.
    #[must_use]
    pub fn admits(self, distance_m: f64) -> bool {
        let boundary = f64::from(TIER_BOUNDARY_M);
        match self {
            Self::Near => distance_m <= boundary,
            Self::Far => distance_m > boundary,
        }
    }
}

/// Error returned when parsing an unknown tier name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown distance tier {0:?} (expected \"near\" or \"far\")")]
pub struct ParseTierError(pub String);

impl FromStr for DistanceTier {
    type Err = ParseTierError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "near" => Ok(Self::Near),
            "far" => Ok(Self::Far),
            _ => Err(ParseTierError(value.to_owned())),
        }
    }
}

impl fmt::Display for DistanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Near => f.write_str("near"),
            Self::Far => f.write_str("far"),
        }
    }
}
