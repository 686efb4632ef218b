use crate::category::NormalizedCategory;
use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};

/// Rules deciding which documents of a case are shown by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Every document in one of these categories is a key document
    pub always_key: Vec<NormalizedCategory>,

    /// Category whose documents compete for the single bail slot
    pub bail_category: NormalizedCategory,

    /// Disposition a bail document needs to be eligible (case-insensitive)
    pub perfected_disposition: String,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            always_key: vec![NormalizedCategory::Rop, NormalizedCategory::Initiating],
            bail_category: NormalizedCategory::Bail,
            perfected_disposition: "PERFECTED".to_string(),
        }
    }
}

impl SelectionPolicy {
    pub fn is_always_key(&self, category: NormalizedCategory) -> bool {
        self.always_key.contains(&category)
    }

    pub fn is_perfected(&self, disposition: Option<&str>) -> bool {
        disposition
            .map(str::trim)
            .is_some_and(|d| d.eq_ignore_ascii_case(self.perfected_disposition.trim()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.always_key.contains(&NormalizedCategory::Uncategorized) {
            return Err(CatalogError::invalid_policy(
                "UNCATEGORIZED documents can never be key documents",
            ));
        }
        if self.always_key.contains(&self.bail_category) {
            return Err(CatalogError::invalid_policy(format!(
                "{} cannot be both always-key and the bail category",
                self.bail_category
            )));
        }
        if self.bail_category == NormalizedCategory::Uncategorized {
            return Err(CatalogError::invalid_policy(
                "bail category must be a known category",
            ));
        }
        if self.perfected_disposition.trim().is_empty() {
            return Err(CatalogError::invalid_policy(
                "perfected_disposition must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = SelectionPolicy::default();
        assert!(policy.validate().is_ok());
        assert!(policy.is_always_key(NormalizedCategory::Rop));
        assert!(policy.is_always_key(NormalizedCategory::Initiating));
        assert!(!policy.is_always_key(NormalizedCategory::Bail));
    }

    #[test]
    fn perfected_match_ignores_case_and_padding() {
        let policy = SelectionPolicy::default();
        assert!(policy.is_perfected(Some("Perfected")));
        assert!(policy.is_perfected(Some(" PERFECTED ")));
        assert!(!policy.is_perfected(Some("Unperfected")));
        assert!(!policy.is_perfected(None));
    }

    #[test]
    fn rejects_inconsistent_policies() {
        let mut policy = SelectionPolicy::default();
        policy.always_key.push(NormalizedCategory::Bail);
        assert!(policy.validate().is_err());

        let mut policy = SelectionPolicy::default();
        policy.always_key.push(NormalizedCategory::Uncategorized);
        assert!(policy.validate().is_err());

        let policy = SelectionPolicy {
            perfected_disposition: " ".to_string(),
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }
}
