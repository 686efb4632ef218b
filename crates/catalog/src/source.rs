use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Upstream system a document listing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceSystem {
    /// Criminal file service
    Criminal,
    /// Civil file service
    Civil,
    /// Digital audio recording transcripts
    Dars,
    /// Transitory documents on the shared drive
    Transitory,
}

impl SourceSystem {
    pub const ALL: [SourceSystem; 4] = [
        SourceSystem::Criminal,
        SourceSystem::Civil,
        SourceSystem::Dars,
        SourceSystem::Transitory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Criminal => "criminal",
            Self::Civil => "civil",
            Self::Dars => "dars",
            Self::Transitory => "transitory",
        }
    }
}

impl std::fmt::Display for SourceSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSystem {
    type Err = CatalogError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = raw.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "criminal" | "crim" | "r" => Ok(Self::Criminal),
            "civil" | "civ" | "i" => Ok(Self::Civil),
            "dars" | "transcript" | "transcripts" => Ok(Self::Dars),
            "transitory" | "transitory_document" | "transitory_documents" | "shared_drive" => {
                Ok(Self::Transitory)
            }
            _ => Err(CatalogError::UnknownSourceSystem(raw.trim().to_string())),
        }
    }
}
