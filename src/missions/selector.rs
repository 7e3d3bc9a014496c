//! Tier unlocking and blueprint selection.
//!
//! Selection is a deterministic scoring pass: prefer blueprints whose recommended level is
//! close to the player's, nudge repeatable content down, and push already-completed repeatables
//! further down. When nothing qualifies, [select_fallback] hands back the first blueprint of the
//! first available tier so a caller always gets a mission.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::catalog::{MissionTierDefinition, TierCatalog, TierMissionBlueprint};
use crate::missions::reputation::ReputationRank;

const REPEATABLE_PENALTY: f64 = 0.5;
const COMPLETED_PENALTY: f64 = 5.0;

/// How free-form completed-mission records are matched against blueprint ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMatching {
    /// A record completes a blueprint when it contains the blueprint id (case-insensitive).
    /// Tolerates persisted ids with suffixes, at the cost of false positives when one
    /// blueprint id is a substring of another record.
    #[default]
    Substring,
    /// A record completes a blueprint only when it equals the blueprint id (case-insensitive).
    Exact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    /// Lowest-weight eligible candidate.
    Weighted,
    /// No eligible candidate; first blueprint of the first available tier.
    Fallback,
}

#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub tier: &'a MissionTierDefinition,
    pub blueprint: &'a TierMissionBlueprint,
    pub reason: SelectionReason,
}

/// Set of completed blueprint ids, compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedBlueprints {
    ids: HashSet<String>,
}

impl CompletedBlueprints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, blueprint_id: &str) {
        self.ids.insert(blueprint_id.to_ascii_lowercase());
    }

    pub fn contains(&self, blueprint_id: &str) -> bool {
        self.ids.contains(&blueprint_id.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for CompletedBlueprints {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

pub fn is_tier_unlocked(
    tier: &MissionTierDefinition,
    player_level: i32,
    reputation: ReputationRank,
) -> bool {
    player_level >= tier.unlock.min_level
        && reputation.score() >= tier.unlock.min_reputation.score()
}

/// Tiers the player meets both the level and reputation gates for, in catalog order.
pub fn unlocked_tiers(
    catalog: &TierCatalog,
    player_level: i32,
    reputation: ReputationRank,
) -> Vec<&MissionTierDefinition> {
    catalog
        .tiers()
        .iter()
        .filter(|tier| is_tier_unlocked(tier, player_level, reputation))
        .collect()
}

/// First tier in catalog order that is not in `unlocked`.
pub fn next_tier<'a>(
    catalog: &'a TierCatalog,
    unlocked: &[&MissionTierDefinition],
) -> Option<&'a MissionTierDefinition> {
    catalog
        .tiers()
        .iter()
        .find(|tier| !unlocked.iter().any(|u| u.id == tier.id))
}

/// Resolve free-form completed-mission records to the catalog blueprint ids they refer to.
pub fn match_completed_blueprints(
    catalog: &TierCatalog,
    completed: &[String],
    matching: CompletionMatching,
) -> CompletedBlueprints {
    let records: Vec<String> = completed
        .iter()
        .map(|record| record.trim().to_ascii_lowercase())
        .filter(|record| !record.is_empty())
        .collect();

    catalog
        .blueprints()
        .map(|(_, bp)| bp.id.as_str())
        .filter(|id| {
            let id = id.to_ascii_lowercase();
            records.iter().any(|record| match matching {
                CompletionMatching::Substring => record.contains(&id),
                CompletionMatching::Exact => *record == id,
            })
        })
        .collect()
}

pub fn prerequisites_met(blueprint: &TierMissionBlueprint, completed: &CompletedBlueprints) -> bool {
    blueprint
        .prerequisites
        .iter()
        .all(|prerequisite| completed.contains(prerequisite))
}

/// Lower is better.
pub fn blueprint_weight(blueprint: &TierMissionBlueprint, player_level: i32, completed: bool) -> f64 {
    let distance = (f64::from(blueprint.recommended_level) - f64::from(player_level)).abs();
    let repeatable = if blueprint.repeatable { REPEATABLE_PENALTY } else { 0.0 };
    let replay = if completed { COMPLETED_PENALTY } else { 0.0 };
    distance + repeatable + replay
}

/// Pick the best blueprint across `available_tiers`, or fall back when nothing is eligible.
pub fn select_blueprint<'a>(
    catalog: &'a TierCatalog,
    player_level: i32,
    completed: &CompletedBlueprints,
    available_tiers: &[&'a MissionTierDefinition],
) -> Selection<'a> {
    let mut candidates: Vec<(f64, &'a MissionTierDefinition, &'a TierMissionBlueprint)> =
        available_tiers
            .iter()
            .copied()
            .flat_map(|tier| tier.missions.iter().map(move |bp| (tier, bp)))
            .filter(|(_, bp)| prerequisites_met(bp, completed))
            .filter_map(|(tier, bp)| {
                let done = completed.contains(&bp.id);
                if done && !bp.repeatable {
                    return None;
                }
                Some((blueprint_weight(bp, player_level, done), tier, bp))
            })
            .collect();

    candidates.sort_by(|left, right| left.0.total_cmp(&right.0));

    match candidates.first() {
        Some(&(_, tier, blueprint)) => Selection {
            tier,
            blueprint,
            reason: SelectionReason::Weighted,
        },
        None => {
            let selection = select_fallback(catalog, available_tiers);
            log::debug!(
                "no eligible blueprint at level {player_level}; falling back to '{}'",
                selection.blueprint.id
            );
            selection
        }
    }
}

/// First blueprint of the first available tier (or of the catalog's first tier when none is
/// available), ignoring prerequisites and completion history.
pub fn select_fallback<'a>(
    catalog: &'a TierCatalog,
    available_tiers: &[&'a MissionTierDefinition],
) -> Selection<'a> {
    let tier = available_tiers
        .iter()
        .copied()
        .find(|tier| !tier.missions.is_empty())
        .unwrap_or_else(|| catalog.first_tier());
    Selection {
        tier,
        blueprint: &tier.missions[0],
        reason: SelectionReason::Fallback,
    }
}
