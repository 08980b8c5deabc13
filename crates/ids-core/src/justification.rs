use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Audit record explaining why an analysis ended in CREATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Justification {
    /// Every candidate that was scored, best first.
    pub evaluated_patterns: Vec<String>,
    /// Why each evaluated candidate was not good enough.
    pub rejection_reasons: BTreeMap<String, String>,
    pub new_capability: String,
    pub review_scheduled: DateTime<Utc>,
}

/// A persisted CREATE decision, as kept in the justification log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JustificationRecord {
    /// Id the new artifact is expected to register under.
    pub entity_id: String,
    pub intent: String,
    pub decided_at: DateTime<Utc>,
    pub justification: Justification,
    /// Times the created artifact has since been picked as a REUSE/ADAPT
    /// target. Maintained outside the engine.
    #[serde(default)]
    pub reusage_count: u32,
}

impl JustificationRecord {
    pub fn review_scheduled(&self) -> DateTime<Utc> {
        self.justification.review_scheduled
    }
}
