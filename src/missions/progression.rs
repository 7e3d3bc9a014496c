//! Progression snapshots and the level/rank progression report.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::data::catalog::{MissionTierDefinition, TierUnlockRequirement};
use crate::missions::reputation::ReputationRank;
use crate::missions::selector::SelectionReason;
use crate::missions::MissionGenerator;

/// Requirements of the first locked tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTierRequirement {
    pub id: String,
    pub label: String,
    pub min_level: i32,
    pub min_reputation: ReputationRank,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_completions: Option<u32>,
}

impl NextTierRequirement {
    pub fn from_tier(tier: &MissionTierDefinition) -> Self {
        let TierUnlockRequirement {
            min_level,
            min_reputation,
            recommended_completions,
        } = tier.unlock.clone();
        Self {
            id: tier.id.clone(),
            label: tier.label.clone(),
            min_level,
            min_reputation,
            recommended_completions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionProgressionSnapshot {
    /// Tiers the player actually meets the gates for; empty below every threshold.
    pub unlocked_tiers: Vec<String>,
    /// Tier the selected mission came from.
    pub recommended_tier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<NextTierRequirement>,
    pub last_updated: DateTime<Utc>,
}

pub fn build_snapshot(
    unlocked: &[&MissionTierDefinition],
    recommended: &MissionTierDefinition,
    next: Option<&MissionTierDefinition>,
    now: DateTime<Utc>,
) -> MissionProgressionSnapshot {
    MissionProgressionSnapshot {
        unlocked_tiers: unlocked.iter().map(|tier| tier.id.clone()).collect(),
        recommended_tier: recommended.id.clone(),
        next_tier: next.map(NextTierRequirement::from_tier),
        last_updated: now,
    }
}

/// One (level, rank) cell of the progression report, evaluated with an empty history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressionRow {
    pub level: i32,
    pub reputation: ReputationRank,
    pub unlocked_tiers: Vec<String>,
    pub next_tier: Option<String>,
    pub recommended_tier: String,
    pub recommended_blueprint: String,
    pub selection: SelectionReason,
}

/// Highest level the progression report evaluates.
pub const MAX_REPORT_LEVEL: i32 = 100;

/// Evaluate every level in `1..=max_level` against every reputation rank, in parallel.
/// `max_level` is clamped to `1..=MAX_REPORT_LEVEL`. Rows come back ordered by level, then rank.
pub fn progression_report(generator: &MissionGenerator, max_level: i32) -> Vec<ProgressionRow> {
    let cells: Vec<(i32, ReputationRank)> = (1..=max_level.clamp(1, MAX_REPORT_LEVEL))
        .flat_map(|level| ReputationRank::ALL.into_iter().map(move |rank| (level, rank)))
        .collect();

    cells
        .par_iter()
        .map(|&(level, rank)| {
            let plan = generator.plan(level, &[], rank.as_str());
            ProgressionRow {
                level,
                reputation: rank,
                unlocked_tiers: plan.unlocked.iter().map(|tier| tier.id.clone()).collect(),
                next_tier: plan.next.map(|tier| tier.id.clone()),
                recommended_tier: plan.selection.tier.id.clone(),
                recommended_blueprint: plan.selection.blueprint.id.clone(),
                selection: plan.selection.reason,
            }
        })
        .collect()
}

/// Write report rows as CSV. Tier lists are joined with `|`.
pub fn write_report_csv<W: std::io::Write>(
    rows: &[ProgressionRow],
    writer: W,
) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "level",
        "reputation",
        "unlocked_tiers",
        "next_tier",
        "recommended_tier",
        "recommended_blueprint",
        "selection",
    ])?;
    for row in rows {
        let selection = match row.selection {
            SelectionReason::Weighted => "weighted",
            SelectionReason::Fallback => "fallback",
        };
        out.write_record([
            row.level.to_string(),
            row.reputation.to_string(),
            row.unlocked_tiers.join("|"),
            row.next_tier.clone().unwrap_or_default(),
            row.recommended_tier.clone(),
            row.recommended_blueprint.clone(),
            selection.to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> &'static MissionGenerator {
        MissionGenerator::builtin().expect("built-in generator")
    }

    #[test]
    fn report_covers_every_level_and_rank_in_order() {
        let rows = progression_report(generator(), 20);
        assert_eq!(rows.len(), 20 * ReputationRank::ALL.len());
        assert_eq!(rows[0].level, 1);
        assert_eq!(rows[0].reputation, ReputationRank::Unknown);
        let last = rows.last().unwrap();
        assert_eq!(last.level, 20);
        assert_eq!(last.reputation, ReputationRank::Mythic);
        assert!(rows
            .windows(2)
            .all(|w| (w[0].level, w[0].reputation) < (w[1].level, w[1].reputation)));
    }

    #[test]
    fn report_level_is_clamped() {
        let rows = progression_report(generator(), i32::MAX);
        assert_eq!(rows.len(), MAX_REPORT_LEVEL as usize * ReputationRank::ALL.len());
        assert_eq!(rows.last().map(|row| row.level), Some(MAX_REPORT_LEVEL));
        assert_eq!(progression_report(generator(), -5).len(), ReputationRank::ALL.len());
    }

    #[test]
    fn report_marks_locked_out_players_as_initiate() {
        let rows = progression_report(generator(), 3);
        let unknown: Vec<_> = rows
            .iter()
            .filter(|row| row.reputation == ReputationRank::Unknown)
            .collect();
        assert!(unknown
            .iter()
            .all(|row| row.unlocked_tiers.is_empty() && row.recommended_tier == "INITIATE"));
    }

    #[test]
    fn report_csv_has_header_and_one_line_per_row() {
        let rows = progression_report(generator(), 2);
        let mut buf = Vec::new();
        write_report_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("level,reputation,unlocked_tiers,next_tier,recommended_tier,recommended_blueprint,selection")
        );
        assert_eq!(lines.count(), rows.len());
    }
}
