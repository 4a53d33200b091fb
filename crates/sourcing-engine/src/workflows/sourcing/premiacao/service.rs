use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::super::adjudication::{
    aggregate, build_lots, AdjudicationBoard, AdjudicationError, SupplierAward,
};
use super::super::defaults::{resolve_defaults, SourcingDefaults};
use super::super::domain::{AdjudicatedItem, EventId, Lot, LotPlan, Proposal};
use super::super::economy::{
    compute_economy, economy_by_lot, EconomySummary, LotEconomyBreakdown,
};
use super::super::ranking::{RankingEngine, RankingOutcome};
use super::super::report::{ComparativeMap, ComparativeMapError};
use super::super::scenarios::{self, ConfigurationError, ProfileDefinition, WeightPolicy, WeightProfile};
use super::repository::{
    AwardRecord, AwardRepository, Notification, NotificationPublisher, RepositoryError,
};
use crate::config::ScoringConfig;

pub const FINALIZED_TEMPLATE: &str = "premiacao_finalizada";
pub const OVERRUN_TEMPLATE: &str = "economia_negativa";

/// Profile chosen by a request: a preset id or an inline `filtros` definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileSelector {
    Preset(String),
    Custom(ProfileDefinition),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRequest {
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub profile: Option<ProfileSelector>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparativeMapRequest {
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub profile: Option<ProfileSelector>,
    #[serde(default, alias = "valorEstimado")]
    pub estimated_value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyRequest {
    #[serde(alias = "valorEstimado")]
    pub estimated_value: Decimal,
    pub awarded: Vec<Proposal>,
    #[serde(default)]
    pub lots: Vec<LotPlan>,
    #[serde(default)]
    pub items: Vec<AdjudicatedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EconomyReport {
    pub summary: EconomySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_lot: Option<LotEconomyBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjudicationRequest {
    pub winners: Vec<Proposal>,
    pub items: Vec<AdjudicatedItem>,
    #[serde(default)]
    pub lots: Vec<LotPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjudicationReport {
    pub awards: Vec<SupplierAward>,
    pub lots: Vec<Lot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsRequest {
    #[serde(alias = "setor")]
    pub sector: String,
    #[serde(alias = "categoria")]
    pub category: String,
    #[serde(default, alias = "cliente")]
    pub client: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizationRequest {
    #[serde(alias = "aprovador")]
    pub approver: String,
    pub winners: Vec<Proposal>,
    pub lots: Vec<LotPlan>,
    pub items: Vec<AdjudicatedItem>,
    /// Falls back to the sum of the lot estimates.
    #[serde(default, alias = "valorEstimado")]
    pub estimated_value: Option<Decimal>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioCatalog {
    pub default_profile: String,
    pub weight_policy: WeightPolicy,
    pub profiles: Vec<WeightProfile>,
}

/// Service composing the scoring engines with the award repository and notification hooks.
pub struct PremiacaoService<R, N> {
    repository: Arc<R>,
    notifications: Arc<N>,
    engine: RankingEngine,
    config: ScoringConfig,
}

impl<R, N> PremiacaoService<R, N>
where
    R: AwardRepository + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(repository: Arc<R>, notifications: Arc<N>, config: ScoringConfig) -> Self {
        Self {
            repository,
            notifications,
            engine: RankingEngine::new(config.weight_policy),
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn scenarios(&self) -> ScenarioCatalog {
        ScenarioCatalog {
            default_profile: self.config.default_profile.clone(),
            weight_policy: self.config.weight_policy,
            profiles: scenarios::presets().to_vec(),
        }
    }

    pub fn resolve_profile(
        &self,
        selector: Option<ProfileSelector>,
    ) -> Result<WeightProfile, ConfigurationError> {
        match selector {
            Some(ProfileSelector::Preset(id)) => scenarios::preset(&id).cloned(),
            Some(ProfileSelector::Custom(definition)) => WeightProfile::try_from(definition),
            None => scenarios::preset(&self.config.default_profile).cloned(),
        }
    }

    pub fn defaults(
        &self,
        request: &DefaultsRequest,
    ) -> Result<SourcingDefaults, PremiacaoServiceError> {
        let defaults = resolve_defaults(
            &request.sector,
            &request.category,
            request.client.as_deref(),
        )?;
        Ok(defaults)
    }

    pub fn rank(&self, request: RankingRequest) -> Result<RankingOutcome, PremiacaoServiceError> {
        let profile = self.resolve_profile(request.profile)?;
        let outcome = self.engine.rank(&request.proposals, &profile)?;
        Ok(outcome)
    }

    pub fn economy(
        &self,
        request: &EconomyRequest,
    ) -> Result<EconomyReport, PremiacaoServiceError> {
        let summary = compute_economy(request.estimated_value, &request.awarded)?;
        let by_lot = if request.lots.is_empty() {
            None
        } else {
            Some(economy_by_lot(&request.lots, &request.items)?)
        };
        Ok(EconomyReport { summary, by_lot })
    }

    pub fn adjudicate(
        &self,
        request: &AdjudicationRequest,
    ) -> Result<AdjudicationReport, PremiacaoServiceError> {
        let awards = aggregate(&request.winners, &request.items)?;
        let lots = build_lots(&request.lots, &request.items)?;
        Ok(AdjudicationReport { awards, lots })
    }

    pub fn comparative_map(
        &self,
        request: ComparativeMapRequest,
    ) -> Result<ComparativeMap, PremiacaoServiceError> {
        let profile = self.resolve_profile(request.profile)?;
        let map = ComparativeMap::build(
            &request.proposals,
            &profile,
            request.estimated_value,
            self.config.weight_policy,
        )?;
        Ok(map)
    }

    /// Declares the winners of an event and persists the result; an event is finalized once.
    pub fn finalize(
        &self,
        event_id: &EventId,
        request: FinalizationRequest,
    ) -> Result<AwardRecord, PremiacaoServiceError> {
        let approver = request.approver.trim();
        if approver.is_empty() {
            return Err(PremiacaoServiceError::MissingApprover);
        }

        let awards = aggregate(&request.winners, &request.items)?;
        let lot_economy = economy_by_lot(&request.lots, &request.items)?;

        let estimated = request
            .estimated_value
            .unwrap_or(lot_economy.total.estimated_value);
        let economy = compute_economy(estimated, &request.winners)?;
        if economy.awarded_value != lot_economy.total.awarded_value {
            warn!(
                event = %event_id,
                proposals = %economy.awarded_value,
                items = %lot_economy.total.awarded_value,
                "winning proposal totals differ from adjudicated item totals"
            );
        }

        let mut board = AdjudicationBoard::new(request.lots, request.items)?;
        board.finalize_all()?;
        let (_, _, lots) = board.into_parts();

        let record = AwardRecord {
            event_id: event_id.clone(),
            approver: approver.to_string(),
            finalized_at: Utc::now(),
            awards,
            lots,
            economy,
            lot_economy,
            notes: request.notes,
        };
        let stored = self.repository.insert(record)?;

        let mut details = BTreeMap::new();
        details.insert("approver".to_string(), stored.approver.clone());
        details.insert("suppliers".to_string(), stored.awards.len().to_string());
        details.insert(
            "awarded_value".to_string(),
            stored.economy.awarded_value.to_string(),
        );
        details.insert("savings".to_string(), stored.economy.savings_rate.label());
        self.notify(Notification {
            template: FINALIZED_TEMPLATE.to_string(),
            event_id: event_id.clone(),
            details,
        });

        if stored.economy.is_overrun() {
            let mut details = BTreeMap::new();
            details.insert(
                "absolute_savings".to_string(),
                stored.economy.absolute_savings.to_string(),
            );
            details.insert("savings".to_string(), stored.economy.savings_rate.label());
            self.notify(Notification {
                template: OVERRUN_TEMPLATE.to_string(),
                event_id: event_id.clone(),
                details,
            });
        }

        info!(event = %event_id, "premiação finalized: {}", stored.summary_line());
        Ok(stored)
    }

    // Runs after the award is stored: failures are logged, never returned.
    fn notify(&self, notification: Notification) {
        let template = notification.template.clone();
        let event_id = notification.event_id.clone();
        if let Err(err) = self.notifications.publish(notification) {
            warn!(
                event = %event_id,
                template = %template,
                error = %err,
                "award stored but notification failed"
            );
        }
    }

    pub fn get(&self, event_id: &EventId) -> Result<AwardRecord, PremiacaoServiceError> {
        let record = self
            .repository
            .fetch(event_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub fn recent(&self, limit: usize) -> Result<Vec<AwardRecord>, PremiacaoServiceError> {
        Ok(self.repository.list(limit)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PremiacaoServiceError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Adjudication(#[from] AdjudicationError),
    #[error("an approver is required to finalize the award")]
    MissingApprover,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<ComparativeMapError> for PremiacaoServiceError {
    fn from(error: ComparativeMapError) -> Self {
        match error {
            ComparativeMapError::Configuration(err) => PremiacaoServiceError::Configuration(err),
            ComparativeMapError::Economy(err) => PremiacaoServiceError::Adjudication(err),
        }
    }
}
