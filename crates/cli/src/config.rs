use anyhow::{Context as AnyhowContext, Result};
use casebundle_bundle::EngineConfig;
use std::fs;
use std::path::Path;

/// Engine configuration: TOML file (when given) → `CASEBUNDLE_FETCH_*`
/// environment overrides → validation.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => parse_config_file(path)?,
        None => EngineConfig::default(),
    };
    let config = config.with_env_overrides();
    config.validate()?;
    log::debug!("Engine config: {config:?}");
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
}
