use std::sync::Arc;

use rust_decimal::Decimal;

use super::common::*;

use crate::workflows::sourcing::adjudication::AdjudicationError;
use crate::workflows::sourcing::domain::{EventType, LotStatus, ProposalStatus};
use crate::workflows::sourcing::economy::SavingsRate;
use crate::workflows::sourcing::premiacao::repository::RepositoryError;
use crate::workflows::sourcing::premiacao::service::{
    ComparativeMapRequest, DefaultsRequest, EconomyRequest, PremiacaoService,
    PremiacaoServiceError, ProfileSelector, RankingRequest, FINALIZED_TEMPLATE, OVERRUN_TEMPLATE,
};
use crate::workflows::sourcing::scenarios::{ConfigurationError, ProfileDefinition, RawWeight};

#[test]
fn finalize_persists_award_and_notifies() {
    let (service, repository, notifications) = build_service();

    let record = service
        .finalize(&event_id(), finalization_request())
        .expect("finalized");

    assert_eq!(record.approver, "Marina Costa");
    assert_eq!(record.awards.len(), 2);
    assert!(record
        .lots
        .iter()
        .all(|lot| lot.status == LotStatus::Finalizado));
    assert_eq!(record.economy.estimated_value, money(310_000));
    assert_eq!(record.economy.absolute_savings, money(27_000));
    assert_eq!(
        record.lot_economy.total.absolute_savings,
        record.economy.absolute_savings
    );

    let stored = repository
        .records
        .lock()
        .expect("repository mutex")
        .get(&event_id())
        .cloned()
        .expect("record stored");
    assert_eq!(stored, record);

    let events = notifications.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, FINALIZED_TEMPLATE);
    assert_eq!(events[0].details["approver"], "Marina Costa");
    assert_eq!(events[0].details["savings"], "8.71%");
}

#[test]
fn finalizing_twice_is_a_conflict() {
    let (service, _, notifications) = build_service();
    service
        .finalize(&event_id(), finalization_request())
        .expect("first finalize");

    let second = service.finalize(&event_id(), finalization_request());
    assert!(matches!(
        second,
        Err(PremiacaoServiceError::Repository(RepositoryError::Conflict))
    ));
    assert_eq!(notifications.events().len(), 1);
}

#[test]
fn blank_approver_is_rejected() {
    let (service, repository, _) = build_service();
    let mut request = finalization_request();
    request.approver = "   ".to_string();

    assert!(matches!(
        service.finalize(&event_id(), request),
        Err(PremiacaoServiceError::MissingApprover)
    ));
    assert!(repository.records.lock().expect("mutex").is_empty());
}

#[test]
fn disqualified_winner_blocks_finalization() {
    let (service, _, _) = build_service();
    let mut request = finalization_request();
    request.winners[1].status = ProposalStatus::Desclassificada;

    assert!(matches!(
        service.finalize(&event_id(), request),
        Err(PremiacaoServiceError::Adjudication(
            AdjudicationError::DisqualifiedWinner(_)
        ))
    ));
}

#[test]
fn overrun_publishes_a_negative_economy_warning() {
    let (service, _, notifications) = build_service();
    let mut request = finalization_request();
    request.estimated_value = Some(money(250_000));

    let record = service.finalize(&event_id(), request).expect("finalized");
    assert!(record.economy.is_overrun());
    assert_eq!(record.economy.absolute_savings, money(-33_000));

    let templates: Vec<String> = notifications
        .events()
        .into_iter()
        .map(|event| event.template)
        .collect();
    assert_eq!(templates, vec![FINALIZED_TEMPLATE, OVERRUN_TEMPLATE]);
}

#[test]
fn notification_failure_still_returns_the_stored_award() {
    let repository = Arc::new(MemoryRepository::default());
    let service = PremiacaoService::new(
        repository.clone(),
        Arc::new(OfflineNotifications),
        scoring_config(),
    );

    let record = service
        .finalize(&event_id(), finalization_request())
        .expect("award kept despite the hook failure");
    assert_eq!(service.get(&event_id()).expect("stored"), record);
    assert!(matches!(
        service.finalize(&event_id(), finalization_request()),
        Err(PremiacaoServiceError::Repository(RepositoryError::Conflict))
    ));
}

#[test]
fn get_missing_award_is_not_found() {
    let (service, _, _) = build_service();
    assert!(matches!(
        service.get(&event_id()),
        Err(PremiacaoServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn recent_lists_finalized_awards() {
    let (service, _, _) = build_service();
    service
        .finalize(&event_id(), finalization_request())
        .expect("finalized");
    let recent = service.recent(10).expect("listed");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].event_id, event_id());
}

#[test]
fn comparative_map_defaults_to_the_configured_profile() {
    let (service, _, _) = build_service();
    let map = service
        .comparative_map(ComparativeMapRequest {
            proposals: scenario_proposals(),
            profile: None,
            estimated_value: Some(money(150_000)),
        })
        .expect("map");

    assert_eq!(map.profile_id, "melhor_score");
    assert_eq!(map.ranking.ranked[0].proposal_id.0, "p-techcorp");
    assert_eq!(map.scenarios.len(), 5);

    let economy = map.provisional_economy.expect("estimate supplied");
    assert_eq!(economy.awarded_value, money(145_000));
    assert_eq!(economy.absolute_savings, money(5_000));

    let menor_preco = map
        .scenarios
        .iter()
        .find(|standing| standing.profile_id == "menor_preco")
        .expect("preset standing");
    assert_eq!(
        menor_preco.leader.as_ref().map(|id| id.0.as_str()),
        Some("p-innovatech")
    );
    assert!(!map.insights.scenario_consensus);
    assert_eq!(
        map.insights.cheapest.as_ref().map(|id| id.0.as_str()),
        Some("p-innovatech")
    );
    assert_eq!(map.insights.lowest_bid, Some(money(138_000)));
    assert_eq!(map.insights.highest_bid, Some(money(162_000)));
    assert_eq!(
        map.insights.average_bid,
        Some(money(148_333) + Decimal::new(33, 2))
    );
    assert!(!map.insights.recommended_actions.is_empty());
}

#[test]
fn comparative_map_accepts_inline_profiles() {
    let (service, _, _) = build_service();
    let map = service
        .comparative_map(ComparativeMapRequest {
            proposals: scenario_proposals(),
            profile: Some(ProfileSelector::Custom(ProfileDefinition {
                id: "so_prazo".to_string(),
                name: Some("Somente prazo".to_string()),
                filtros: vec![RawWeight {
                    criterio: "Prazo".to_string(),
                    peso: 100,
                }],
            })),
            estimated_value: None,
        })
        .expect("map");

    assert_eq!(map.profile_name, "Somente prazo");
    assert_eq!(map.ranking.ranked[0].proposal_id.0, "p-global");
    assert!(map.provisional_economy.is_none());
}

#[test]
fn unknown_preset_is_a_configuration_error() {
    let (service, _, _) = build_service();
    let result = service.rank(RankingRequest {
        proposals: scenario_proposals(),
        profile: Some(ProfileSelector::Preset("mais_barato".to_string())),
    });
    assert!(matches!(
        result,
        Err(PremiacaoServiceError::Configuration(
            ConfigurationError::UnknownProfile(_)
        ))
    ));
}

#[test]
fn strict_policy_rejects_partial_inline_profiles() {
    let service = PremiacaoService::new(
        Arc::new(MemoryRepository::default()),
        Arc::new(MemoryNotifications::default()),
        strict_config(),
    );
    let result = service.rank(RankingRequest {
        proposals: scenario_proposals(),
        profile: Some(ProfileSelector::Custom(ProfileDefinition {
            id: "parcial".to_string(),
            name: None,
            filtros: vec![RawWeight {
                criterio: "preco".to_string(),
                peso: 70,
            }],
        })),
    });
    assert!(matches!(
        result,
        Err(PremiacaoServiceError::Configuration(
            ConfigurationError::WeightSumMismatch { sum: 70, .. }
        ))
    ));
}

#[test]
fn economy_request_includes_lot_breakdown_when_lots_are_given() {
    let (service, _, _) = build_service();
    let report = service
        .economy(&EconomyRequest {
            estimated_value: money(310_000),
            awarded: winners(),
            lots: lot_plans(),
            items: items(),
        })
        .expect("economy");
    let by_lot = report.by_lot.expect("breakdown");
    assert_eq!(by_lot.total.absolute_savings, report.summary.absolute_savings);

    let bare = service
        .economy(&EconomyRequest {
            estimated_value: money(0),
            awarded: winners(),
            lots: Vec::new(),
            items: Vec::new(),
        })
        .expect("economy");
    assert!(bare.by_lot.is_none());
    assert_eq!(bare.summary.savings_rate, SavingsRate::NotApplicable);
}

#[test]
fn defaults_resolve_through_the_rule_table() {
    let (service, _, _) = build_service();
    let defaults = service
        .defaults(&DefaultsRequest {
            sector: "Serviços".to_string(),
            category: "Consultoria".to_string(),
            client: None,
        })
        .expect("defaults");
    assert_eq!(defaults.event_type, EventType::Rfp);
    assert_eq!(defaults.profile.id, "tecnica_e_preco");
}

#[test]
fn scenario_catalog_reports_configuration() {
    let (service, _, _) = build_service();
    let catalog = service.scenarios();
    assert_eq!(catalog.default_profile, "melhor_score");
    assert_eq!(catalog.profiles.len(), 5);
}
