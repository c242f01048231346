use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::LatePolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PenaltyUnit {
    #[default]
    Minute,
    Hour,
    Day,
}

impl PenaltyUnit {
    pub const ALL: [PenaltyUnit; 3] = [PenaltyUnit::Minute, PenaltyUnit::Hour, PenaltyUnit::Day];

    pub fn seconds(self) -> i64 {
        match self {
            PenaltyUnit::Minute => 60,
            PenaltyUnit::Hour => 60 * 60,
            PenaltyUnit::Day => 24 * 60 * 60,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PenaltyUnit::Minute => "Minute",
            PenaltyUnit::Hour => "Hour",
            PenaltyUnit::Day => "Day",
        }
    }
}

impl fmt::Display for PenaltyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PenaltyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minute" => Ok(PenaltyUnit::Minute),
            "hour" => Ok(PenaltyUnit::Hour),
            "day" => Ok(PenaltyUnit::Day),
            other => Err(format!("unknown penalty unit: {other}")),
        }
    }
}

impl LatePolicy {
    /// Penalty points for a submission made at `submitted` against `due`.
    /// A started unit counts as a whole one; the result never exceeds
    /// `max_penalty`.
    pub fn penalty_for(&self, due: DateTime<Utc>, submitted: DateTime<Utc>) -> i32 {
        let late = (submitted - due).num_seconds();
        if late <= 0 || self.penalty_per_unit <= 0 {
            return 0;
        }
        let unit = self.penalty_unit.seconds();
        let units = (late + unit - 1) / unit;
        let penalty = units.saturating_mul(i64::from(self.penalty_per_unit));
        penalty.min(i64::from(self.max_penalty)) as i32
    }
}
