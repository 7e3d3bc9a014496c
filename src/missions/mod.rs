pub mod progression;
pub mod reputation;
pub mod selector;
pub mod template;

use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::catalog::{CatalogError, MissionTierDefinition, TierCatalog, TierUnlockRequirement};
use crate::missions::progression::{build_snapshot, MissionProgressionSnapshot};
use crate::missions::reputation::ReputationRank;
use crate::missions::selector::{
    match_completed_blueprints, next_tier, select_blueprint, unlocked_tiers, CompletedBlueprints,
    CompletionMatching, Selection, SelectionReason,
};
use crate::missions::template::{build_mission_template, MissionTemplate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierSummary {
    pub id: String,
    pub label: String,
    pub description: String,
    pub unlock: TierUnlockRequirement,
}

impl TierSummary {
    pub fn from_tier(tier: &MissionTierDefinition) -> Self {
        Self {
            id: tier.id.clone(),
            label: tier.label.clone(),
            description: tier.description.clone(),
            unlock: tier.unlock.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedMission {
    pub mission: MissionTemplate,
    pub tier: TierSummary,
    pub progression: MissionProgressionSnapshot,
    /// `fallback` when no blueprint was eligible and the catalog head was used instead.
    pub selection: SelectionReason,
}

/// Everything decided for one generation call before the mission is built.
pub(crate) struct Plan<'a> {
    pub rank: ReputationRank,
    pub unlocked: Vec<&'a MissionTierDefinition>,
    pub next: Option<&'a MissionTierDefinition>,
    pub selection: Selection<'a>,
}

/// Upper bound on the up-front allocation for a batch; larger batches grow as they go.
const BATCH_PREALLOCATION: usize = 64;

/// Generator facade over a tier catalog. Cheap to clone; the catalog is shared.
#[derive(Debug, Clone)]
pub struct MissionGenerator {
    catalog: Arc<TierCatalog>,
    matching: CompletionMatching,
}

impl MissionGenerator {
    pub fn new(catalog: TierCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            matching: CompletionMatching::default(),
        }
    }

    /// Generator over the embedded catalog, built once per process.
    pub fn builtin() -> Result<&'static MissionGenerator, &'static CatalogError> {
        static GENERATOR: OnceLock<MissionGenerator> = OnceLock::new();
        let catalog = TierCatalog::builtin()?;
        Ok(GENERATOR.get_or_init(|| MissionGenerator::new(catalog.clone())))
    }

    pub fn with_matching(mut self, matching: CompletionMatching) -> Self {
        self.matching = matching;
        self
    }

    pub fn catalog(&self) -> &TierCatalog {
        &self.catalog
    }

    pub fn matching(&self) -> CompletionMatching {
        self.matching
    }

    pub(crate) fn plan(&self, player_level: i32, completed: &[String], reputation: &str) -> Plan<'_> {
        let catalog = self.catalog.as_ref();
        let rank = ReputationRank::normalize(reputation);
        let unlocked = unlocked_tiers(catalog, player_level, rank);
        let available = if unlocked.is_empty() {
            vec![catalog.first_tier()]
        } else {
            unlocked.clone()
        };
        let completed: CompletedBlueprints =
            match_completed_blueprints(catalog, completed, self.matching);
        let selection = select_blueprint(catalog, player_level, &completed, &available);
        let next = next_tier(catalog, &unlocked);
        Plan {
            rank,
            unlocked,
            next,
            selection,
        }
    }

    pub fn generate_mission(
        &self,
        player_level: i32,
        completed: &[String],
        reputation: &str,
    ) -> GeneratedMission {
        self.generate_mission_at(player_level, completed, reputation, Utc::now())
    }

    /// Same as [MissionGenerator::generate_mission] with an explicit clock.
    pub fn generate_mission_at(
        &self,
        player_level: i32,
        completed: &[String],
        reputation: &str,
        now: DateTime<Utc>,
    ) -> GeneratedMission {
        let plan = self.plan(player_level, completed, reputation);
        let Selection {
            tier,
            blueprint,
            reason,
        } = plan.selection;
        GeneratedMission {
            mission: build_mission_template(tier, blueprint, player_level, plan.rank, now),
            tier: TierSummary::from_tier(tier),
            progression: build_snapshot(&plan.unlocked, tier, plan.next, now),
            selection: reason,
        }
    }

    /// Generate `count` missions, treating each generated blueprint as completed for the rest
    /// of the batch. The caller's history is not modified.
    pub fn generate_mission_batch(
        &self,
        player_level: i32,
        completed: &[String],
        reputation: &str,
        count: usize,
    ) -> Vec<GeneratedMission> {
        let mut history = completed.to_vec();
        let mut batch = Vec::with_capacity(count.min(BATCH_PREALLOCATION));
        for _ in 0..count {
            let generated = self.generate_mission(player_level, &history, reputation);
            history.push(generated.mission.blueprint_id.clone());
            batch.push(generated);
        }
        batch
    }

    /// Progression snapshot for a player without building a mission.
    pub fn progression_at(
        &self,
        player_level: i32,
        completed: &[String],
        reputation: &str,
        now: DateTime<Utc>,
    ) -> MissionProgressionSnapshot {
        let plan = self.plan(player_level, completed, reputation);
        build_snapshot(&plan.unlocked, plan.selection.tier, plan.next, now)
    }
}

/// [MissionGenerator::generate_mission] on the built-in catalog.
pub fn generate_mission(
    player_level: i32,
    completed: &[String],
    reputation: &str,
) -> Result<GeneratedMission, &'static CatalogError> {
    Ok(MissionGenerator::builtin()?.generate_mission(player_level, completed, reputation))
}

/// [MissionGenerator::generate_mission_batch] on the built-in catalog.
pub fn generate_mission_batch(
    player_level: i32,
    completed: &[String],
    reputation: &str,
    count: usize,
) -> Result<Vec<GeneratedMission>, &'static CatalogError> {
    Ok(MissionGenerator::builtin()?.generate_mission_batch(
        player_level,
        completed,
        reputation,
        count,
    ))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn generator() -> &'static MissionGenerator {
        MissionGenerator::builtin().expect("built-in generator")
    }

    #[test]
    fn generation_is_deterministic_for_a_fixed_clock() {
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let history = vec!["initiate_recon_sweep".to_string()];
        let a = generator().generate_mission_at(3, &history, "novice", now);
        let b = generator().generate_mission_at(3, &history, "NOVICE", now);
        assert_eq!(a, b);
        assert_eq!(a.progression.last_updated, now);
        assert_eq!(a.mission.generated_at, now);
    }

    #[test]
    fn batch_larger_than_preallocation_is_filled() {
        let batch = generator().generate_mission_batch(18, &[], "ELITE", BATCH_PREALLOCATION + 6);
        assert_eq!(batch.len(), BATCH_PREALLOCATION + 6);
        // Only repeatables remain once the catalog is exhausted.
        assert!(batch[BATCH_PREALLOCATION..].iter().all(|g| g.mission.repeatable));
    }

    #[test]
    fn locked_out_player_still_gets_initiate_content() {
        let generated = generator().generate_mission(0, &[], "UNKNOWN");
        assert_eq!(generated.mission.tier_id, "INITIATE");
        assert_eq!(generated.tier.id, "INITIATE");
        assert!(generated.progression.unlocked_tiers.is_empty());
        assert_eq!(generated.progression.recommended_tier, "INITIATE");
        assert_eq!(
            generated.progression.next_tier.as_ref().map(|t| t.id.as_str()),
            Some("INITIATE")
        );
        // UNKNOWN is one rank short of the NOVICE gate.
        assert_eq!(generated.mission.rewards.reputation, 5 + 2);
    }

    #[test]
    fn exact_matching_is_selectable_per_generator() {
        let exact = generator().clone().with_matching(CompletionMatching::Exact);
        assert_eq!(exact.matching(), CompletionMatching::Exact);
        let history = vec!["initiate_recon_sweep_v2".to_string()];
        let picked = exact.generate_mission(1, &history, "NOVICE");
        assert_eq!(picked.mission.blueprint_id, "initiate_recon_sweep");

        let substring = generator().generate_mission(1, &history, "NOVICE");
        assert_ne!(substring.mission.blueprint_id, "initiate_recon_sweep");
    }

    #[test]
    fn batch_does_not_touch_caller_history() {
        let history: Vec<String> = Vec::new();
        let batch = generator().generate_mission_batch(1, &history, "NOVICE", 3);
        assert_eq!(batch.len(), 3);
        assert!(history.is_empty());
        assert!(generator().generate_mission_batch(1, &history, "NOVICE", 0).is_empty());
    }

    #[test]
    fn progression_snapshot_matches_generation() {
        let now = Utc.with_ymd_and_hms(2026, 5, 5, 0, 0, 0).unwrap();
        let snapshot = generator().progression_at(12, &[], "operative", now);
        let generated = generator().generate_mission_at(12, &[], "operative", now);
        assert_eq!(snapshot, generated.progression);
        assert_eq!(snapshot.unlocked_tiers, vec!["INITIATE", "OPERATIVE", "VETERAN"]);
        assert_eq!(snapshot.next_tier.map(|t| t.id), Some("ELITE".to_string()));
    }
}
