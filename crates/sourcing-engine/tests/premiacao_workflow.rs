use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use sourcing_engine::config::ScoringConfig;
use sourcing_engine::workflows::planilha::{ItemCsvImporter, ProposalCsvImporter};
use sourcing_engine::workflows::sourcing::premiacao::{
    AwardRecord, AwardRepository, ComparativeMapRequest, FinalizationRequest, Notification,
    NotificationError, NotificationPublisher, PremiacaoService, PremiacaoServiceError,
    ProfileSelector, RepositoryError, FINALIZED_TEMPLATE,
};
use sourcing_engine::workflows::sourcing::{
    EventId, LotId, LotPlan, LotStatus, Proposal, SavingsRate,
};

#[derive(Default)]
struct InMemoryAwards {
    records: Mutex<HashMap<EventId, AwardRecord>>,
}

impl AwardRepository for InMemoryAwards {
    fn insert(&self, record: AwardRecord) -> Result<AwardRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("awards lock");
        if guard.contains_key(&record.event_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.event_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, event_id: &EventId) -> Result<Option<AwardRecord>, RepositoryError> {
        Ok(self.records.lock().expect("awards lock").get(event_id).cloned())
    }

    fn list(&self, limit: usize) -> Result<Vec<AwardRecord>, RepositoryError> {
        let guard = self.records.lock().expect("awards lock");
        Ok(guard.values().take(limit).cloned().collect())
    }
}

#[derive(Default)]
struct RecordingNotifications {
    sent: Mutex<Vec<Notification>>,
}

impl NotificationPublisher for RecordingNotifications {
    fn publish(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent.lock().expect("notifications lock").push(notification);
        Ok(())
    }
}

fn imported_proposals() -> Vec<Proposal> {
    let data = include_bytes!("data/propostas.csv");
    ProposalCsvImporter::from_reader(&data[..]).expect("bid spreadsheet imports")
}

fn lot_plans() -> Vec<LotPlan> {
    vec![
        LotPlan {
            id: LotId("lote-1".to_string()),
            name: "Hardware".to_string(),
            estimated_value: Decimal::new(160_000, 0),
            criterion: Some("melhor_score".to_string()),
        },
        LotPlan {
            id: LotId("lote-2".to_string()),
            name: "Serviços de suporte".to_string(),
            estimated_value: Decimal::new(150_000, 0),
            criterion: Some("menor_preco".to_string()),
        },
    ]
}

#[test]
fn spreadsheet_to_finalized_award() {
    let repository = Arc::new(InMemoryAwards::default());
    let notifications = Arc::new(RecordingNotifications::default());
    let service = PremiacaoService::new(
        repository.clone(),
        notifications.clone(),
        ScoringConfig::default(),
    );

    let proposals = imported_proposals();
    let map = service
        .comparative_map(ComparativeMapRequest {
            proposals: proposals.clone(),
            profile: Some(ProfileSelector::Preset("melhor_score".to_string())),
            estimated_value: Some(Decimal::new(310_000, 0)),
        })
        .expect("comparative map");
    assert_eq!(
        map.insights.leader.as_ref().map(|id| id.0.as_str()),
        Some("p-techcorp")
    );
    assert_eq!(map.scenarios.len(), 5);

    let winners: Vec<Proposal> = proposals
        .into_iter()
        .filter(|proposal| matches!(proposal.id.0.as_str(), "p-techcorp" | "p-innovatech"))
        .collect();
    let items = ItemCsvImporter::from_reader(&include_bytes!("data/itens.csv")[..])
        .expect("item spreadsheet imports");

    let event_id = EventId("evt-2025-017".to_string());
    let record = service
        .finalize(
            &event_id,
            FinalizationRequest {
                approver: "  Marina Costa ".to_string(),
                winners,
                lots: lot_plans(),
                items,
                estimated_value: None,
                notes: None,
            },
        )
        .expect("award finalizes");

    assert_eq!(record.approver, "Marina Costa");
    assert_eq!(record.economy.estimated_value, Decimal::new(310_000, 0));
    assert_eq!(record.economy.awarded_value, Decimal::new(283_000, 0));
    assert_eq!(record.economy.absolute_savings, Decimal::new(27_000, 0));
    assert!(matches!(record.economy.savings_rate, SavingsRate::Applicable(_)));
    assert_eq!(record.economy.savings_rate.label(), "8.71%");

    let lot_savings: Decimal = record
        .lot_economy
        .lots
        .iter()
        .map(|lot| lot.summary.absolute_savings)
        .sum();
    assert_eq!(lot_savings, record.lot_economy.total.absolute_savings);

    assert_eq!(record.awards.len(), 2);
    assert_eq!(record.awards[0].supplier.legal_name, "TechCorp Soluções Ltda");
    assert_eq!(record.awards[0].total_value, Decimal::new(145_000, 0));
    assert!(record
        .lots
        .iter()
        .all(|lot| lot.status == LotStatus::Finalizado));

    let sent = notifications.sent.lock().expect("notifications lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].template, FINALIZED_TEMPLATE);
    drop(sent);

    let stored = service.get(&event_id).expect("award stored");
    assert_eq!(stored, record);
}

#[test]
fn second_finalization_is_rejected() {
    let service = PremiacaoService::new(
        Arc::new(InMemoryAwards::default()),
        Arc::new(RecordingNotifications::default()),
        ScoringConfig::default(),
    );
    let items = ItemCsvImporter::from_reader(&include_bytes!("data/itens.csv")[..])
        .expect("item spreadsheet imports");
    let winners: Vec<Proposal> = imported_proposals().into_iter().take(2).collect();
    let request = FinalizationRequest {
        approver: "Marina Costa".to_string(),
        winners,
        lots: lot_plans(),
        items,
        estimated_value: Some(Decimal::new(300_000, 0)),
        notes: None,
    };
    let event_id = EventId("evt-2025-018".to_string());

    service
        .finalize(&event_id, request.clone())
        .expect("first finalization");
    let error = service
        .finalize(&event_id, request)
        .expect_err("second finalization");

    assert!(matches!(
        error,
        PremiacaoServiceError::Repository(RepositoryError::Conflict)
    ));
}
