//! Environment configuration.
//!
//! - `ROGUESIM_BIND`: server bind address (default `127.0.0.1:3000`).
//! - `ROGUESIM_CATALOG`: path to a YAML tier catalog replacing the built-in one. A catalog that
//!   fails to load is logged and the built-in catalog is used instead.

use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;

use crate::data::catalog::{CatalogError, TierCatalog};
use crate::missions::MissionGenerator;

pub const BIND_ENV: &str = "ROGUESIM_BIND";
pub const CATALOG_ENV: &str = "ROGUESIM_CATALOG";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

pub fn bind_addr() -> String {
    env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
}

pub fn catalog_path() -> Option<PathBuf> {
    env::var_os(CATALOG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Generator used by the server and CLI: the `ROGUESIM_CATALOG` override when it loads,
/// otherwise the built-in catalog. Resolved once per process.
pub fn active_generator() -> Result<&'static MissionGenerator, &'static CatalogError> {
    static OVERRIDE: OnceLock<Option<MissionGenerator>> = OnceLock::new();
    let custom = OVERRIDE.get_or_init(|| {
        let path = catalog_path()?;
        match TierCatalog::from_yaml_path(&path) {
            Ok(catalog) => {
                log::info!("loaded mission catalog from {}", path.display());
                Some(MissionGenerator::new(catalog))
            }
            Err(err) => {
                log::error!(
                    "failed to load {CATALOG_ENV}={}: {err}; using built-in catalog",
                    path.display()
                );
                None
            }
        }
    });
    match custom {
        Some(generator) => Ok(generator),
        None => MissionGenerator::builtin(),
    }
}
