//! RogueSim mission progression: tiered mission catalog, blueprint selection and
//! player-scaled mission generation, with a small JSON API and CLI on top.

pub mod cli;
pub mod config;
pub mod data;
pub mod missions;
pub mod server;

pub use data::catalog::{CatalogError, TierCatalog};
pub use missions::reputation::ReputationRank;
pub use missions::{generate_mission, generate_mission_batch, GeneratedMission, MissionGenerator};
