use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::super::adjudication::AdjudicationError;
use super::super::domain::Proposal;
use super::super::economy::{compute_economy, EconomySummary};
use super::super::ranking::{RankingEngine, RankingOutcome};
use super::super::scenarios::{self, ConfigurationError, WeightPolicy, WeightProfile};
use super::insights::generate_insights;
use super::views::{ComparativeInsights, ScenarioRank, ScenarioStanding};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparativeMapError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Economy(#[from] AdjudicationError),
}

/// The "mapa comparativo": every figure on it is produced by the ranking and economy engines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeMap {
    pub profile_id: String,
    pub profile_name: String,
    pub ranking: RankingOutcome,
    pub scenarios: Vec<ScenarioStanding>,
    /// Economy obtained if the rank-1 proposal were awarded; needs an estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisional_economy: Option<EconomySummary>,
    pub insights: ComparativeInsights,
}

impl ComparativeMap {
    pub fn build(
        proposals: &[Proposal],
        profile: &WeightProfile,
        estimated: Option<Decimal>,
        policy: WeightPolicy,
    ) -> Result<Self, ComparativeMapError> {
        let engine = RankingEngine::new(policy);
        let ranking = engine.rank(proposals, profile)?;

        let scenarios = scenarios::presets()
            .iter()
            .map(|preset| standing(&engine, proposals, preset))
            .collect::<Result<Vec<_>, _>>()?;

        let leader = ranking.leader().and_then(|entry| {
            proposals
                .iter()
                .find(|proposal| proposal.id == entry.proposal_id)
        });
        let provisional_economy = match (estimated, leader) {
            (Some(estimated), Some(leader)) => {
                Some(compute_economy(estimated, std::slice::from_ref(leader))?)
            }
            _ => None,
        };

        let insights =
            generate_insights(proposals, &ranking, &scenarios, provisional_economy.as_ref());

        debug!(
            profile = %profile.id,
            scenarios = scenarios.len(),
            consensus = insights.scenario_consensus,
            "comparative map built"
        );

        Ok(Self {
            profile_id: profile.id.clone(),
            profile_name: profile.name.clone(),
            ranking,
            scenarios,
            provisional_economy,
            insights,
        })
    }
}

fn standing(
    engine: &RankingEngine,
    proposals: &[Proposal],
    preset: &WeightProfile,
) -> Result<ScenarioStanding, ConfigurationError> {
    let outcome = engine.rank_quietly(proposals, preset)?;
    let leader = outcome.leader();

    Ok(ScenarioStanding {
        profile_id: preset.id.clone(),
        profile_name: preset.name.clone(),
        leader: leader.map(|entry| entry.proposal_id.clone()),
        leader_supplier: leader.map(|entry| entry.supplier.legal_name.clone()),
        leader_score: leader.map(|entry| entry.composite_score),
        ranks: outcome
            .ranked
            .iter()
            .map(|entry| ScenarioRank {
                proposal_id: entry.proposal_id.clone(),
                rank: entry.rank,
                composite_score: entry.composite_score,
            })
            .collect(),
    })
}
