//! Player-scaled mission instances built from a blueprint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::catalog::{MissionTierDefinition, TierMissionBlueprint};
use crate::missions::reputation::ReputationRank;

const DIFFICULTY_PER_LEVEL: f64 = 0.25;
const CREDIT_BONUS_PER_LEVEL: f64 = 0.12;
const REPUTATION_BONUS_PER_RANK: u32 = 2;
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionRewards {
    pub credits: u32,
    pub reputation: u32,
    pub unlocks: Vec<String>,
}

/// A generated mission. Not persisted here; the id is `{blueprint_id}::{base36 millis}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionTemplate {
    pub id: String,
    pub blueprint_id: String,
    pub tier_id: String,
    pub title: String,
    pub synopsis: String,
    pub target: String,
    pub recommended_level: i32,
    pub difficulty: u8,
    pub tags: Vec<String>,
    pub objectives: Vec<String>,
    pub commands: Vec<String>,
    pub hints: Vec<String>,
    pub rewards: MissionRewards,
    pub storyline: String,
    pub narrative_beats: Vec<String>,
    pub repeatable: bool,
    pub generated_at: DateTime<Utc>,
}

/// Difficulty drifts a quarter step per level of mismatch, clamped to 1..=10.
pub fn scaled_difficulty(blueprint: &TierMissionBlueprint, player_level: i32) -> u8 {
    let gap = f64::from(player_level) - f64::from(blueprint.recommended_level);
    (f64::from(blueprint.difficulty) + gap * DIFFICULTY_PER_LEVEL)
        .clamp(f64::from(MIN_DIFFICULTY), f64::from(MAX_DIFFICULTY))
        .round() as u8
}

/// Credits grow 12% per level the player is above the blueprint. Under-leveled players get
/// the base amount.
pub fn scaled_credits(blueprint: &TierMissionBlueprint, player_level: i32) -> u32 {
    let over = (f64::from(player_level) - f64::from(blueprint.recommended_level)).max(0.0);
    (f64::from(blueprint.rewards.credits) * (1.0 + over * CREDIT_BONUS_PER_LEVEL)).round() as u32
}

/// Bonus reputation for taking on a tier whose reputation gate is above the player's rank.
pub fn scaled_reputation(
    tier: &MissionTierDefinition,
    blueprint: &TierMissionBlueprint,
    reputation: ReputationRank,
) -> u32 {
    let shortfall = tier
        .unlock
        .min_reputation
        .score()
        .saturating_sub(reputation.score());
    blueprint
        .rewards
        .reputation
        .saturating_add(u32::from(shortfall) * REPUTATION_BONUS_PER_RANK)
}

pub fn mission_id(blueprint_id: &str, now: DateTime<Utc>) -> String {
    format!("{blueprint_id}::{}", to_base36(now.timestamp_millis()))
}

fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut n = value.unsigned_abs();
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize] as char);
        n /= 36;
    }
    if value < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}

pub fn build_mission_template(
    tier: &MissionTierDefinition,
    blueprint: &TierMissionBlueprint,
    player_level: i32,
    reputation: ReputationRank,
    now: DateTime<Utc>,
) -> MissionTemplate {
    MissionTemplate {
        id: mission_id(&blueprint.id, now),
        blueprint_id: blueprint.id.clone(),
        tier_id: tier.id.clone(),
        title: blueprint.title.clone(),
        synopsis: blueprint.synopsis.clone(),
        target: blueprint.target.clone(),
        recommended_level: blueprint.recommended_level,
        difficulty: scaled_difficulty(blueprint, player_level),
        tags: blueprint.tags.clone(),
        objectives: blueprint.objectives.clone(),
        commands: blueprint.commands.clone(),
        hints: blueprint.hints.clone(),
        rewards: MissionRewards {
            credits: scaled_credits(blueprint, player_level),
            reputation: scaled_reputation(tier, blueprint, reputation),
            unlocks: blueprint.rewards.unlocks.clone(),
        },
        storyline: blueprint.storyline.clone(),
        narrative_beats: blueprint.narrative_beats.clone(),
        repeatable: blueprint.repeatable,
        generated_at: now,
    }
}
