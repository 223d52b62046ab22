use serde::{Deserialize, Serialize};
use std::fs;

use crate::paths;

/// Root structure of the user-level ~/.config/svcgen/svcgen.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SvcgenConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

/// Values seeded into a new solution's svcgen.json by `init`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Git URL of the solution template repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_repo: Option<String>,

    #[serde(default = "default_services_dir")]
    pub services_dir: String,

    #[serde(default = "default_template_service")]
    pub template_service: String,

    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            template_repo: None,
            services_dir: default_services_dir(),
            template_service: default_template_service(),
            ignore: Vec::new(),
        }
    }
}

pub(crate) fn default_services_dir() -> String {
    "services".to_string()
}

pub(crate) fn default_template_service() -> String {
    "User".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load defaults, merging file config with built-in defaults.
/// If the file is missing or invalid, returns built-in defaults.
pub fn load_defaults() -> Defaults {
    load_config().defaults
}

/// Load the full user config, falling back to defaults on any error.
pub fn load_config() -> SvcgenConfig {
    load_config_from_file().ok().flatten().unwrap_or_default()
}

fn load_config_from_file() -> crate::Result<Option<SvcgenConfig>> {
    let path = paths::svcgen_json()?;

    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    let config: SvcgenConfig = serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))?;

    Ok(Some(config))
}

/// Get the path to the user config (for display purposes)
pub fn config_path() -> crate::Result<String> {
    Ok(paths::svcgen_json()?.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_falls_back_per_field() {
        let config: SvcgenConfig =
            serde_json::from_str(r#"{"defaults":{"template_repo":"git@host:t.git"}}"#).unwrap();
        assert_eq!(config.defaults.template_repo.as_deref(), Some("git@host:t.git"));
        assert_eq!(config.defaults.services_dir, "services");
        assert_eq!(config.defaults.template_service, "User");
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: SvcgenConfig = serde_json::from_str("{}").unwrap();
        assert!(config.defaults.template_repo.is_none());
        assert!(config.defaults.ignore.is_empty());
    }
}
