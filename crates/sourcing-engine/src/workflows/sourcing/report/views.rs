use rust_decimal::Decimal;
use serde::Serialize;

use super::super::domain::ProposalId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioRank {
    pub proposal_id: ProposalId,
    pub rank: u32,
    pub composite_score: f64,
}

/// Outcome of one preset scenario over the same proposals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioStanding {
    pub profile_id: String,
    pub profile_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<ProposalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_supplier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_score: Option<f64>,
    pub ranks: Vec<ScenarioRank>,
}

impl ScenarioStanding {
    pub fn rank_of(&self, proposal_id: &ProposalId) -> Option<u32> {
        self.ranks
            .iter()
            .find(|entry| &entry.proposal_id == proposal_id)
            .map(|entry| entry.rank)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparativeInsights {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lowest_bid: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_bid: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_bid: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_spread_pct: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<ProposalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cheapest: Option<ProposalId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader_premium_pct: Option<Decimal>,
    /// True when every preset scenario puts the same proposal first.
    pub scenario_consensus: bool,
    pub observations: Vec<String>,
    pub recommended_actions: Vec<String>,
}
