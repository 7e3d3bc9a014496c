use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::data::catalog::{CatalogError, TierUnlockRequirement};
use crate::missions::selector::CompletionMatching;
use crate::missions::MissionGenerator;

pub const MAX_BATCH: u32 = 25;
const MAX_COMPLETED_RECORDS: usize = 2_000;

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub player_level: i32,
    #[serde(default)]
    pub completed_missions: Vec<String>,
    #[serde(default)]
    pub reputation: Option<String>,
    #[serde(default)]
    pub matching: Option<CompletionMatching>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    #[serde(flatten)]
    pub player: GenerateRequest,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub enum PayloadError {
    /// Request body could not be decoded.
    Parse(serde_json::Error),
    Validation(ValidationErrorResponse),
    /// Response could not be encoded.
    Serialize(serde_json::Error),
    Catalog(&'static CatalogError),
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "{err}"),
            Self::Validation(_) => write!(f, "invalid mission request"),
            Self::Serialize(err) => write!(f, "failed to encode response: {err}"),
            Self::Catalog(err) => write!(f, "mission catalog unavailable: {err}"),
        }
    }
}

impl std::error::Error for PayloadError {}

impl From<&'static CatalogError> for PayloadError {
    fn from(err: &'static CatalogError) -> Self {
        Self::Catalog(err)
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "roguesim-missions",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct TierListItem {
    pub id: String,
    pub label: String,
    pub description: String,
    pub unlock: TierUnlockRequirement,
    pub mission_count: usize,
}

pub fn tiers_payload() -> Result<String, PayloadError> {
    let generator = config::active_generator()?;
    let tiers: Vec<TierListItem> = generator
        .catalog()
        .tiers()
        .iter()
        .map(|tier| TierListItem {
            id: tier.id.clone(),
            label: tier.label.clone(),
            description: tier.description.clone(),
            unlock: tier.unlock.clone(),
            mission_count: tier.missions.len(),
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({ "tiers": tiers }))
        .map_err(PayloadError::Serialize)
}

fn generator_for(request: &GenerateRequest) -> Result<MissionGenerator, PayloadError> {
    let generator = config::active_generator()?.clone();
    Ok(match request.matching {
        Some(matching) => generator.with_matching(matching),
        None => generator,
    })
}

pub fn generate_payload(body: &str) -> Result<String, PayloadError> {
    let request: GenerateRequest =
        serde_json::from_str(body).map_err(PayloadError::Parse)?;
    validate_player(&request, Vec::new())?;

    let generated = generator_for(&request)?.generate_mission(
        request.player_level,
        &request.completed_missions,
        request.reputation.as_deref().unwrap_or_default(),
    );
    serde_json::to_string_pretty(&generated).map_err(PayloadError::Serialize)
}

pub fn batch_payload(body: &str) -> Result<String, PayloadError> {
    let request: BatchRequest = serde_json::from_str(body).map_err(PayloadError::Parse)?;
    let count = request.count.unwrap_or(1);

    let mut errors = Vec::new();
    if !(1..=MAX_BATCH).contains(&count) {
        errors.push(ValidationIssue {
            field: "count",
            messages: vec![format!("must be between 1 and {MAX_BATCH}")],
        });
    }
    validate_player(&request.player, errors)?;

    let missions = generator_for(&request.player)?.generate_mission_batch(
        request.player.player_level,
        &request.player.completed_missions,
        request.player.reputation.as_deref().unwrap_or_default(),
        count as usize,
    );
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "count": missions.len(),
        "missions": missions,
    }))
    .map_err(PayloadError::Serialize)
}

/// GET /api/missions/progression?level=<n>&reputation=<label>
pub fn progression_payload(path: &str) -> Result<String, PayloadError> {
    let level_raw = query_param(path, "level");
    let reputation = query_param(path, "reputation").unwrap_or_default();

    let level = match level_raw.as_deref().map(str::parse::<i32>) {
        Some(Ok(level)) => level,
        Some(Err(_)) | None => {
            return Err(PayloadError::Validation(ValidationErrorResponse {
                status: "error",
                message: "Validation failed",
                errors: vec![ValidationIssue {
                    field: "level",
                    messages: vec!["must be an integer".to_string()],
                }],
            }));
        }
    };

    let snapshot =
        config::active_generator()?.progression_at(level, &[], &reputation, chrono::Utc::now());
    serde_json::to_string_pretty(&snapshot).map_err(PayloadError::Serialize)
}

/// Form-decoded query value for `name` (case-insensitive key). A malformed query string
/// reads as empty.
fn query_param(path: &str, name: &str) -> Option<String> {
    let query = path.split_once('?').map(|(_, q)| q)?;
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
    pairs
        .into_iter()
        .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim().to_string())
}

fn validate_player(
    request: &GenerateRequest,
    mut errors: Vec<ValidationIssue>,
) -> Result<(), PayloadError> {
    if request.completed_missions.len() > MAX_COMPLETED_RECORDS {
        errors.push(ValidationIssue {
            field: "completed_missions",
            messages: vec![format!("must contain at most {MAX_COMPLETED_RECORDS} entries")],
        });
    }

    if errors.is_empty() {
        return Ok(());
    }

    Err(PayloadError::Validation(ValidationErrorResponse {
        status: "error",
        message: "Validation failed",
        errors,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_reads_plus_encoded_values() {
        let path = "/api/missions/progression?level=12&reputation=Elite+Operator";
        assert_eq!(query_param(path, "level").as_deref(), Some("12"));
        assert_eq!(query_param(path, "reputation").as_deref(), Some("Elite Operator"));
        assert_eq!(query_param(path, "missing"), None);
        assert_eq!(query_param("/api/missions/progression", "level"), None);
    }

    #[test]
    fn query_param_decodes_percent_escapes() {
        let path = "/api/missions/progression?level=%2D3&Reputation=%4C%65gend%61ry";
        assert_eq!(query_param(path, "level").as_deref(), Some("-3"));
        assert_eq!(query_param(path, "reputation").as_deref(), Some("Legendary"));
        assert_eq!(
            query_param("/p?reputation=%C3%89lite%20ops", "reputation").as_deref(),
            Some("Élite ops")
        );
    }

    #[test]
    fn batch_request_flattens_player_fields() {
        let request: BatchRequest = serde_json::from_str(
            r#"{"player_level":4,"reputation":"rookie","matching":"exact","count":3}"#,
        )
        .unwrap();
        assert_eq!(request.player.player_level, 4);
        assert_eq!(request.player.matching, Some(CompletionMatching::Exact));
        assert_eq!(request.count, Some(3));
        assert!(request.player.completed_missions.is_empty());
    }
}
