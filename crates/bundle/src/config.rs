use crate::error::{BundleError, Result};
use casebundle_catalog::SelectionPolicy;
use casebundle_fetch::FetchConfig;
use serde::{Deserialize, Serialize};

/// Everything a [`crate::BundleService`] needs besides its document source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fetch: FetchConfig,
    pub selection: SelectionPolicy,
}

impl EngineConfig {
    /// Apply `CASEBUNDLE_FETCH_*` overrides on top of this configuration.
    pub fn with_env_overrides(self) -> Self {
        Self {
            fetch: self.fetch.with_env_overrides(),
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.fetch
            .validate()
            .map_err(|msg| BundleError::InvalidConfig(format!("fetch: {msg}")))?;
        self.selection
            .validate()
            .map_err(|err| BundleError::InvalidConfig(format!("selection: {err}")))?;
        Ok(())
    }
}
