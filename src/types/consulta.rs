//! Request and outcome of a single consultation

use crate::types::{AdvisoryResult, AdvisorySource, AvailabilitySignal};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Inbound body of `POST /consultar`
///
/// Both fields are required; empty strings are accepted and forwarded as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsultaRequest {
    /// Brand name to assess
    #[serde(rename = "marca")]
    pub brand: String,

    /// Line of business the brand will be used for
    #[serde(rename = "descripcion")]
    pub description: String,
}

/// Everything known about one consultation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub request_id: Uuid,
    pub checked_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub advisory_source: AdvisorySource,
    pub availability: AvailabilitySignal,
    /// Reconciled result, the body returned over HTTP
    pub result: AdvisoryResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_names() {
        let req: ConsultaRequest =
            serde_json::from_str(r#"{"marca": "Zyrqon", "descripcion": "software tools"}"#)
                .unwrap();
        assert_eq!(req.brand, "Zyrqon");
        assert_eq!(req.description, "software tools");
    }

    #[test]
    fn test_request_requires_both_fields() {
        let missing = serde_json::from_str::<ConsultaRequest>(r#"{"marca": "Zyrqon"}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn test_request_accepts_empty_strings() {
        let req: ConsultaRequest =
            serde_json::from_str(r#"{"marca": "", "descripcion": ""}"#).unwrap();
        assert!(req.brand.is_empty());
        assert!(req.description.is_empty());
    }
}
