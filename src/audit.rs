//! Per-request audit record
//!
//! Ties a report id to a digest of the exact model text it was built from
//! and to the source of every resolved field.

use crate::models::FieldSource;
use crate::resolver::ResolutionTrace;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportAudit {
    pub report_id: Uuid,
    /// Hex SHA-256 of the raw model response
    pub response_digest: String,
    pub payload_parsed: bool,
    pub chain_of_thought_present: bool,
    pub resolution: ResolutionTrace,
    pub created_at: DateTime<Utc>,
}

impl ReportAudit {
    pub fn new(
        report_id: Uuid,
        raw_response: &str,
        payload_parsed: bool,
        chain_of_thought_present: bool,
        resolution: ResolutionTrace,
    ) -> Self {
        Self {
            report_id,
            response_digest: compute_response_digest(raw_response),
            payload_parsed,
            chain_of_thought_present,
            resolution,
            created_at: Utc::now(),
        }
    }

    /// True when the model supplied none of the numeric fields
    pub fn fully_computed(&self) -> bool {
        [
            self.resolution.categories_breakdown,
            self.resolution.monthly_investment_recommendation,
            self.resolution.projected_balance_by_year,
        ]
        .iter()
        .all(|source| *source != FieldSource::Model)
    }
}

/// Compute SHA256 hash of a raw response for later comparison
pub fn compute_response_digest(raw_response: &str) -> String {
    hex::encode(Sha256::digest(raw_response.as_bytes()))
}
