use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single entry in the append-only audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor: String,
    pub action: String,
    pub entity: String,
    pub recorded_at: DateTime<Utc>,
    pub details: BTreeMap<String, String>,
}

impl AuditEvent {
    pub fn new(actor: impl Into<String>, action: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            action: action.into(),
            entity: entity.into(),
            recorded_at: Utc::now(),
            details: BTreeMap::new(),
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Trait describing the outbound audit hook so services stay storage-agnostic.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent) -> Result<(), AuditError>;
}

/// Audit dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("audit transport unavailable: {0}")]
    Transport(String),
}
