use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use sourcing_engine::config::ScoringConfig;
use sourcing_engine::workflows::sourcing::premiacao::{
    AwardRecord, AwardRepository, Notification, NotificationError, NotificationPublisher,
    RepositoryError,
};
use sourcing_engine::workflows::sourcing::EventId;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) scoring: ScoringConfig,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAwardRepository {
    records: Arc<Mutex<HashMap<EventId, AwardRecord>>>,
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> RepositoryError {
    RepositoryError::Unavailable("award store lock poisoned".to_string())
}

impl AwardRepository for InMemoryAwardRepository {
    fn insert(&self, record: AwardRecord) -> Result<AwardRecord, RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        if guard.contains_key(&record.event_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.event_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, event_id: &EventId) -> Result<Option<AwardRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard.get(event_id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<AwardRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        let mut records: Vec<AwardRecord> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.finalized_at.cmp(&a.finalized_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| NotificationError::Transport("notification lock poisoned".to_string()))?;
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as an amount like 150000.00 ({err})"))
}
