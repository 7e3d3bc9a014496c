//! Mission tier catalog: tiers, their unlock requirements, and the blueprints they offer.
//! The built-in catalog is authored in `data/missions/tiers.yaml` and embedded at compile time.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::missions::reputation::ReputationRank;

const BUILTIN_CATALOG_YAML: &str = include_str!("../../data/missions/tiers.yaml");

/// Gate for a tier. `recommended_completions` is advisory and never enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierUnlockRequirement {
    pub min_level: i32,
    pub min_reputation: ReputationRank,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_completions: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintRewards {
    pub credits: u32,
    pub reputation: u32,
    #[serde(default)]
    pub unlocks: Vec<String>,
}

/// Static mission content before any player scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMissionBlueprint {
    pub id: String,
    pub title: String,
    pub synopsis: String,
    pub target: String,
    pub recommended_level: i32,
    /// 1 (trivial) to 10 (finale).
    pub difficulty: u8,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub hints: Vec<String>,
    pub rewards: BlueprintRewards,
    #[serde(default)]
    pub storyline: String,
    #[serde(default)]
    pub narrative_beats: Vec<String>,
    #[serde(default)]
    pub repeatable: bool,
    /// Blueprint ids that must be completed before this one is offered.
    #[serde(default)]
    pub prerequisites: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionTierDefinition {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub unlock: TierUnlockRequirement,
    pub missions: Vec<TierMissionBlueprint>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    tiers: Vec<MissionTierDefinition>,
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    /// The catalog declares no tiers.
    Empty,
    /// A tier declares no missions; holds the tier id.
    EmptyTier(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "unable to read catalog: {e}"),
            Self::Parse(e) => write!(f, "unable to parse catalog: {e}"),
            Self::Empty => write!(f, "catalog has no tiers"),
            Self::EmptyTier(id) => write!(f, "tier '{id}' has no missions"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Empty | Self::EmptyTier(_) => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Parse(e)
    }
}

/// Ordered, immutable list of tiers. Always holds at least one tier, and every tier at least
/// one blueprint, so a fallback mission exists for any input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCatalog {
    tiers: Vec<MissionTierDefinition>,
}

impl TierCatalog {
    pub fn new(tiers: Vec<MissionTierDefinition>) -> Result<Self, CatalogError> {
        if tiers.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(tier) = tiers.iter().find(|tier| tier.missions.is_empty()) {
            return Err(CatalogError::EmptyTier(tier.id.clone()));
        }
        Ok(Self { tiers })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(raw)?;
        Self::new(file.tiers)
    }

    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// The embedded catalog, parsed once per process.
    pub fn builtin() -> Result<&'static TierCatalog, &'static CatalogError> {
        static CATALOG: OnceLock<Result<TierCatalog, CatalogError>> = OnceLock::new();
        CATALOG
            .get_or_init(|| Self::from_yaml_str(BUILTIN_CATALOG_YAML))
            .as_ref()
    }

    pub fn tiers(&self) -> &[MissionTierDefinition] {
        &self.tiers
    }

    pub fn first_tier(&self) -> &MissionTierDefinition {
        &self.tiers[0]
    }

    pub fn tier(&self, id: &str) -> Option<&MissionTierDefinition> {
        self.tiers.iter().find(|tier| tier.id == id)
    }

    /// Every (tier, blueprint) pair in catalog order.
    pub fn blueprints(
        &self,
    ) -> impl Iterator<Item = (&MissionTierDefinition, &TierMissionBlueprint)> + '_ {
        self.tiers
            .iter()
            .flat_map(|tier| tier.missions.iter().map(move |bp| (tier, bp)))
    }

    pub fn find_blueprint(
        &self,
        id: &str,
    ) -> Option<(&MissionTierDefinition, &TierMissionBlueprint)> {
        self.blueprints()
            .find(|(_, bp)| bp.id.eq_ignore_ascii_case(id))
    }

    pub fn blueprint_count(&self) -> usize {
        self.tiers.iter().map(|tier| tier.missions.len()).sum()
    }
}
