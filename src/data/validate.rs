use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::data::catalog::TierCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.count(ValidationSeverity::Error) > 0
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    /// Diagnostics ordered by severity (errors first), then by context.
    pub fn sorted(&self) -> Vec<&ValidationDiagnostic> {
        let mut sorted: Vec<&ValidationDiagnostic> = self.diagnostics.iter().collect();
        sorted.sort_by(|a, b| a.severity.cmp(&b.severity).then_with(|| a.context.cmp(&b.context)));
        sorted
    }
}

/// Check a catalog for authoring mistakes that parsing alone does not catch.
pub fn validate_catalog(catalog: &TierCatalog) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen_tiers = HashSet::new();
    for tier in catalog.tiers() {
        if !seen_tiers.insert(tier.id.to_ascii_lowercase()) {
            report.push(
                ValidationSeverity::Error,
                format!("tier[{}]", tier.id),
                "duplicate tier id",
            );
        }
    }

    for pair in catalog.tiers().windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.unlock.min_level < prev.unlock.min_level
            || next.unlock.min_reputation < prev.unlock.min_reputation
        {
            report.push(
                ValidationSeverity::Warning,
                format!("tier[{}]", next.id),
                format!(
                    "unlock requirement is lower than preceding tier '{}'; next-tier hints will be misleading",
                    prev.id
                ),
            );
        }
    }

    let mut owners: HashMap<String, usize> = HashMap::new();
    for (_, bp) in catalog.blueprints() {
        *owners.entry(bp.id.to_ascii_lowercase()).or_default() += 1;
    }
    let known: HashSet<&str> = owners.keys().map(String::as_str).collect();

    for (tier, bp) in catalog.blueprints() {
        let context = format!("{}/{}", tier.id, bp.id);
        let id = bp.id.to_ascii_lowercase();

        if id.trim().is_empty() {
            report.push(ValidationSeverity::Error, context.clone(), "blueprint id is empty");
            continue;
        }
        if owners.get(&id).copied().unwrap_or(0) > 1 {
            report.push(ValidationSeverity::Error, context.clone(), "duplicate blueprint id");
        }
        if !(1..=10).contains(&bp.difficulty) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("difficulty {} is outside 1..=10", bp.difficulty),
            );
        }
        for prerequisite in &bp.prerequisites {
            let prerequisite = prerequisite.to_ascii_lowercase();
            if prerequisite == id {
                report.push(
                    ValidationSeverity::Warning,
                    context.clone(),
                    "blueprint lists itself as a prerequisite and can never be offered",
                );
            } else if !known.contains(prerequisite.as_str()) {
                report.push(
                    ValidationSeverity::Warning,
                    context.clone(),
                    format!("prerequisite '{prerequisite}' is not in the catalog; blueprint is permanently locked"),
                );
            }
        }
        for other in known.iter().filter(|other| **other != id && other.contains(id.as_str())) {
            report.push(
                ValidationSeverity::Warning,
                context.clone(),
                format!("id is a substring of '{other}'; substring completion matching will conflate them"),
            );
        }
        if bp.recommended_level < tier.unlock.min_level {
            report.push(
                ValidationSeverity::Info,
                context,
                format!(
                    "recommended level {} is below the tier gate ({})",
                    bp.recommended_level, tier.unlock.min_level
                ),
            );
        }
    }

    report
}

/// Load a YAML catalog from `path` and validate it.
pub fn validate_catalog_file(path: &str) -> Result<ValidationReport, String> {
    let catalog = TierCatalog::from_yaml_path(path).map_err(|err| format!("'{path}': {err}"))?;
    Ok(validate_catalog(&catalog))
}
