use serde::{Deserialize, Serialize};

/// Canonical document taxonomy shared by every source system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NormalizedCategory {
    /// Record of proceedings
    Rop,
    /// Information, indictment or other document that starts a file
    Initiating,
    Bail,
    Transcript,
    CourtSummary,
    /// Recognized upstream "other" bucket
    Other,
    /// Nothing usable was supplied; never a key document
    Uncategorized,
}

impl NormalizedCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rop => "ROP",
            Self::Initiating => "INITIATING",
            Self::Bail => "BAIL",
            Self::Transcript => "TRANSCRIPT",
            Self::CourtSummary => "COURT_SUMMARY",
            Self::Other => "OTHER",
            Self::Uncategorized => "UNCATEGORIZED",
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Uncategorized
    }
}

impl std::fmt::Display for NormalizedCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Keys are upper-case with single spaces.
const ALIASES: &[(&str, NormalizedCategory)] = &[
    ("ROP", NormalizedCategory::Rop),
    ("RECORD OF PROCEEDINGS", NormalizedCategory::Rop),
    ("RECORD OF PROCEEDING", NormalizedCategory::Rop),
    ("INITIATING", NormalizedCategory::Initiating),
    ("INITIATING DOCUMENT", NormalizedCategory::Initiating),
    ("INITIATING DOCUMENTS", NormalizedCategory::Initiating),
    ("INFORMATION", NormalizedCategory::Initiating),
    ("INDICTMENT", NormalizedCategory::Initiating),
    ("BAIL", NormalizedCategory::Bail),
    ("BAIL ORDER", NormalizedCategory::Bail),
    ("RECOGNIZANCE", NormalizedCategory::Bail),
    ("UNDERTAKING", NormalizedCategory::Bail),
    ("TRANSCRIPT", NormalizedCategory::Transcript),
    ("TRANSCRIPTS", NormalizedCategory::Transcript),
    ("DARS", NormalizedCategory::Transcript),
    ("CSR", NormalizedCategory::CourtSummary),
    ("COURT SUMMARY", NormalizedCategory::CourtSummary),
    ("COURT SUMMARY REPORT", NormalizedCategory::CourtSummary),
    ("OTHER", NormalizedCategory::Other),
];

fn lookup_key(raw: &str) -> Option<String> {
    let key = raw
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    (!key.is_empty()).then_some(key)
}

/// Resolve one raw label; `None` when blank or unrecognized.
pub fn lookup_category(raw: &str) -> Option<NormalizedCategory> {
    let key = lookup_key(raw)?;
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, category)| *category)
}

/// Map raw upstream labels onto the canonical taxonomy.
///
/// `raw_category` wins when it resolves; otherwise `raw_classification` is
/// consulted. Never fails: anything unrecognized is
/// [`NormalizedCategory::Uncategorized`].
pub fn normalize(
    raw_category: Option<&str>,
    raw_classification: Option<&str>,
) -> NormalizedCategory {
    raw_category
        .and_then(lookup_category)
        .or_else(|| raw_classification.and_then(lookup_category))
        .unwrap_or(NormalizedCategory::Uncategorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_case_and_whitespace_insensitive() {
        assert_eq!(normalize(Some("  rop "), None), NormalizedCategory::Rop);
        assert_eq!(
            normalize(Some("Record   of\tProceedings"), None),
            NormalizedCategory::Rop
        );
        assert_eq!(
            normalize(Some("court_summary"), None),
            NormalizedCategory::CourtSummary
        );
    }

    #[test]
    fn category_takes_precedence_over_classification() {
        assert_eq!(
            normalize(Some("Initiating"), Some("Bail")),
            NormalizedCategory::Initiating
        );
    }

    #[test]
    fn falls_back_to_classification_when_category_missing_or_unknown() {
        assert_eq!(normalize(None, Some("bail")), NormalizedCategory::Bail);
        assert_eq!(normalize(Some(""), Some("Bail")), NormalizedCategory::Bail);
        assert_eq!(
            normalize(Some("Miscellaneous"), Some("Recognizance")),
            NormalizedCategory::Bail
        );
    }

    #[test]
    fn unknown_or_absent_values_are_uncategorized() {
        assert_eq!(normalize(None, None), NormalizedCategory::Uncategorized);
        assert_eq!(normalize(Some("   "), Some("")), NormalizedCategory::Uncategorized);
        assert_eq!(
            normalize(Some("Affidavit"), Some("Exhibit")),
            NormalizedCategory::Uncategorized
        );
        assert!(!NormalizedCategory::Uncategorized.is_known());
    }

    #[test]
    fn other_is_a_known_category() {
        assert_eq!(normalize(Some("other"), None), NormalizedCategory::Other);
        assert!(NormalizedCategory::Other.is_known());
    }

    #[test]
    fn labels_serialize_as_canonical_strings() {
        for category in [
            NormalizedCategory::Rop,
            NormalizedCategory::Initiating,
            NormalizedCategory::Bail,
            NormalizedCategory::Transcript,
            NormalizedCategory::CourtSummary,
            NormalizedCategory::Other,
            NormalizedCategory::Uncategorized,
        ] {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }
}
