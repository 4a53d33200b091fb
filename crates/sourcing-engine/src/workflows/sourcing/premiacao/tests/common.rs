use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::config::ScoringConfig;
use crate::workflows::sourcing::domain::{
    AdjudicatedItem, Criterion, EventId, LotId, LotPlan, Proposal, ProposalId, ProposalStatus,
    Supplier,
};
use crate::workflows::sourcing::premiacao::repository::{
    AwardRecord, AwardRepository, Notification, NotificationError, NotificationPublisher,
    RepositoryError,
};
use crate::workflows::sourcing::premiacao::service::{FinalizationRequest, PremiacaoService};
use crate::workflows::sourcing::premiacao::premiacao_router;
use crate::workflows::sourcing::scenarios::WeightPolicy;

pub(super) fn money(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

pub(super) fn techcorp() -> Supplier {
    Supplier::new("TechCorp Soluções Ltda", "12.345.678/0001-90")
}

pub(super) fn innovatech() -> Supplier {
    Supplier::new("InnovaTech Sistemas S.A.", "23.456.789/0001-01")
}

pub(super) fn global() -> Supplier {
    Supplier::new("Global Supply Comércio", "34.567.890/0001-12")
}

/// Scores in `Criterion::ordered()` order: preco, qualidade, prazo, tecnico, comercial.
pub(super) fn proposal(id: &str, supplier: Supplier, value: i64, scores: [f64; 5]) -> Proposal {
    let criteria: BTreeMap<Criterion, f64> =
        Criterion::ordered().into_iter().zip(scores).collect();
    Proposal {
        id: ProposalId(id.to_string()),
        supplier,
        total_value: money(value),
        criteria,
        status: ProposalStatus::Classificada,
    }
}

pub(super) fn scenario_proposals() -> Vec<Proposal> {
    vec![
        proposal("p-techcorp", techcorp(), 145_000, [8.5, 9.0, 8.0, 9.2, 8.8]),
        proposal("p-innovatech", innovatech(), 138_000, [9.0, 8.5, 7.0, 8.0, 8.5]),
        proposal("p-global", global(), 162_000, [7.0, 8.8, 9.5, 8.5, 7.8]),
    ]
}

pub(super) fn winners() -> Vec<Proposal> {
    scenario_proposals().into_iter().take(2).collect()
}

pub(super) fn lot_plans() -> Vec<LotPlan> {
    vec![
        LotPlan {
            id: LotId("lote-1".to_string()),
            name: "Hardware".to_string(),
            estimated_value: money(160_000),
            criterion: Some("melhor_score".to_string()),
        },
        LotPlan {
            id: LotId("lote-2".to_string()),
            name: "Serviços de suporte".to_string(),
            estimated_value: money(150_000),
            criterion: Some("menor_preco".to_string()),
        },
    ]
}

/// Items whose per-supplier totals match the winning proposals (145k and 138k).
pub(super) fn items() -> Vec<AdjudicatedItem> {
    vec![
        AdjudicatedItem::priced(
            "item-1",
            "lote-1",
            techcorp(),
            "Notebook corporativo",
            money(20),
            money(5_000),
        ),
        AdjudicatedItem::priced(
            "item-2",
            "lote-1",
            techcorp(),
            "Monitor 27 polegadas",
            money(30),
            money(1_500),
        ),
        AdjudicatedItem::priced(
            "item-3",
            "lote-2",
            innovatech(),
            "Suporte técnico mensal",
            money(12),
            money(11_500),
        )
        .with_criterion("menor_preco"),
    ]
}

pub(super) fn finalization_request() -> FinalizationRequest {
    FinalizationRequest {
        approver: "Marina Costa".to_string(),
        winners: winners(),
        lots: lot_plans(),
        items: items(),
        estimated_value: None,
        notes: Some("Aprovado em comitê".to_string()),
    }
}

pub(super) fn scoring_config() -> ScoringConfig {
    ScoringConfig::default()
}

pub(super) fn strict_config() -> ScoringConfig {
    ScoringConfig {
        weight_policy: WeightPolicy::Strict,
        ..ScoringConfig::default()
    }
}

pub(super) fn event_id() -> EventId {
    EventId("evt-2025-017".to_string())
}

pub(super) fn build_service() -> (
    PremiacaoService<MemoryRepository, MemoryNotifications>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifications>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(MemoryNotifications::default());
    let service =
        PremiacaoService::new(repository.clone(), notifications.clone(), scoring_config());
    (service, repository, notifications)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<EventId, AwardRecord>>>,
}

impl AwardRepository for MemoryRepository {
    fn insert(&self, record: AwardRecord) -> Result<AwardRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.event_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.event_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, event_id: &EventId) -> Result<Option<AwardRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(event_id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<AwardRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut records: Vec<_> = guard.values().cloned().collect();
        records.sort_by(|a, b| b.finalized_at.cmp(&a.finalized_at));
        records.truncate(limit);
        Ok(records)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

impl NotificationPublisher for MemoryNotifications {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifications;

impl NotificationPublisher for OfflineNotifications {
    fn publish(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Transport("smtp relay down".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl AwardRepository for UnavailableRepository {
    fn insert(&self, _record: AwardRecord) -> Result<AwardRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _event_id: &EventId) -> Result<Option<AwardRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _limit: usize) -> Result<Vec<AwardRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn router_with_service(
    service: PremiacaoService<MemoryRepository, MemoryNotifications>,
) -> axum::Router {
    premiacao_router(Arc::new(service))
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
