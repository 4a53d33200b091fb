use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::adjudication::SupplierAward;
use super::super::domain::{EventId, Lot};
use super::super::economy::{EconomySummary, LotEconomyBreakdown};

/// Finalized premiação of a sourcing event, as handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AwardRecord {
    pub event_id: EventId,
    pub approver: String,
    pub finalized_at: DateTime<Utc>,
    pub awards: Vec<SupplierAward>,
    pub lots: Vec<Lot>,
    pub economy: EconomySummary,
    pub lot_economy: LotEconomyBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AwardRecord {
    pub fn summary_line(&self) -> String {
        format!(
            "{} supplier(s) awarded {} (savings {})",
            self.awards.len(),
            self.economy.awarded_value,
            self.economy.savings_rate.label()
        )
    }
}

/// Storage abstraction for finalized awards.
pub trait AwardRepository: Send + Sync {
    /// Fails with `Conflict` when the event already has a record.
    fn insert(&self, record: AwardRecord) -> Result<AwardRecord, RepositoryError>;
    fn fetch(&self, event_id: &EventId) -> Result<Option<AwardRecord>, RepositoryError>;
    fn list(&self, limit: usize) -> Result<Vec<AwardRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("award already finalized for this event")]
    Conflict,
    #[error("award not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound operator notification hook (toasts, e-mail).
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub template: String,
    pub event_id: EventId,
    pub details: BTreeMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
