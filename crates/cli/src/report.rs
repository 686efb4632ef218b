use casebundle_bundle::BundleError;
use casebundle_catalog::CatalogError;
use casebundle_fetch::SourceError;
use casebundle_protocol::ErrorEnvelope;

/// Map a command failure onto the envelope printed on stdout.
pub fn error_envelope(err: &anyhow::Error) -> ErrorEnvelope {
    let message = format!("{err:#}");

    if let Some(bundle) = err.downcast_ref::<BundleError>() {
        return ErrorEnvelope {
            code: bundle.code().to_string(),
            message,
            hint: bundle_hint(bundle).map(str::to_string),
        };
    }

    if err.downcast_ref::<CatalogError>().is_some() {
        return ErrorEnvelope {
            code: "invalid_request".to_string(),
            message,
            hint: Some("Check sourceSystem and documentId values.".to_string()),
        };
    }

    if err.downcast_ref::<SourceError>().is_some() {
        return ErrorEnvelope {
            code: "invalid_source".to_string(),
            message,
            hint: Some("Check --source-dir or --upstream.".to_string()),
        };
    }

    if err.downcast_ref::<serde_json::Error>().is_some() {
        return ErrorEnvelope {
            code: "invalid_json".to_string(),
            message,
            hint: Some("The request must be a JSON object with caseId and documents.".to_string()),
        };
    }

    ErrorEnvelope {
        code: "cli_error".to_string(),
        message,
        hint: None,
    }
}

fn bundle_hint(err: &BundleError) -> Option<&'static str> {
    match err {
        BundleError::EmptyRequest => Some("Add at least one entry to documents."),
        BundleError::NoKeyDocuments(_) => {
            Some("Retry without keyDocumentsOnly to bundle every document.")
        }
        BundleError::InvalidRequest(_) => Some("Check sourceSystem and documentId values."),
        BundleError::InvalidConfig(_) => {
            Some("Check the --config file and CASEBUNDLE_FETCH_* variables.")
        }
        BundleError::Cancelled | BundleError::Pdf(_) => None,
    }
}
