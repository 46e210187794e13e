use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::portfolio::snapshot::PortfolioSnapshot;
use crate::quotes::SourceClassification;

/// Describes how a published snapshot was produced.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub timestamp: DateTime<Utc>,
    pub provenance: SourceClassification,
    pub badge: String,
    pub processing_time_ms: u64,
    pub updates_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing: Vec<String>,
    #[serde(default)]
    pub cache_hits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseMetadata {
    pub fn new(
        provenance: SourceClassification,
        processing_time_ms: u64,
        updates_count: usize,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            provenance,
            badge: provenance.badge().to_string(),
            processing_time_ms,
            updates_count,
            missing: Vec::new(),
            cache_hits: 0,
            error: None,
        }
    }
}

/// The published portfolio: snapshot plus its metadata.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub data: PortfolioSnapshot,
    pub metadata: ResponseMetadata,
}
