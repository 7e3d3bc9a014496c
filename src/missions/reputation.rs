//! Reputation ladder used to gate mission tiers.
//!
//! Player reputation arrives as free text (whatever the profile store holds), so every
//! comparison goes through [ReputationRank::normalize] first. Unrecognized labels rank lowest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Reputation ranks in ascending order. Comparison is by ordinal position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ReputationRank {
    #[default]
    Unknown,
    Novice,
    Rookie,
    Operative,
    Veteran,
    Elite,
    Legend,
    Mythic,
}

impl ReputationRank {
    pub const ALL: [ReputationRank; 8] = [
        Self::Unknown,
        Self::Novice,
        Self::Rookie,
        Self::Operative,
        Self::Veteran,
        Self::Elite,
        Self::Legend,
        Self::Mythic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Novice => "NOVICE",
            Self::Rookie => "ROOKIE",
            Self::Operative => "OPERATIVE",
            Self::Veteran => "VETERAN",
            Self::Elite => "ELITE",
            Self::Legend => "LEGEND",
            Self::Mythic => "MYTHIC",
        }
    }

    /// Ordinal position on the ladder, 0 for `UNKNOWN`.
    pub fn score(self) -> u8 {
        self as u8
    }

    /// Map a free-text label onto the ladder.
    ///
    /// Exact labels match case-insensitively; otherwise a label that starts with a rank name
    /// (e.g. "Legendary", "elite operator") takes that rank. Anything else is `UNKNOWN`.
    pub fn normalize(raw: &str) -> Self {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.is_empty() {
            return Self::Unknown;
        }
        if let Some(rank) = Self::ALL.iter().find(|rank| rank.as_str() == upper) {
            return *rank;
        }
        Self::ALL
            .iter()
            .rev()
            .find(|rank| upper.starts_with(rank.as_str()))
            .copied()
            .unwrap_or(Self::Unknown)
    }
}

/// Free-function form of [ReputationRank::normalize].
pub fn normalize_reputation(raw: &str) -> ReputationRank {
    ReputationRank::normalize(raw)
}

/// Free-function form of [ReputationRank::score].
pub fn reputation_score(rank: ReputationRank) -> u8 {
    rank.score()
}

impl fmt::Display for ReputationRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReputationRank {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::normalize(s))
    }
}

impl Serialize for ReputationRank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ReputationRank {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::normalize(&raw))
    }
}
