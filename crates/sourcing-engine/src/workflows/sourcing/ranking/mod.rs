mod policy;
mod rules;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{Criterion, Proposal, ProposalId, ProposalStatus, Supplier};
use super::scenarios::{ConfigurationError, WeightPolicy, WeightProfile};
use policy::{compare_candidates, RankingCandidate};

/// Stateless engine ranking proposals under a weight profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine {
    policy: WeightPolicy,
}

impl RankingEngine {
    pub fn new(policy: WeightPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> WeightPolicy {
        self.policy
    }

    /// Ranks every non-disqualified proposal 1..N; the inputs are never mutated.
    pub fn rank(
        &self,
        proposals: &[Proposal],
        profile: &WeightProfile,
    ) -> Result<RankingOutcome, ConfigurationError> {
        self.rank_with(proposals, profile, true)
    }

    /// Same ranking without logging the data warnings, which stay on the outcome.
    pub(crate) fn rank_quietly(
        &self,
        proposals: &[Proposal],
        profile: &WeightProfile,
    ) -> Result<RankingOutcome, ConfigurationError> {
        self.rank_with(proposals, profile, false)
    }

    fn rank_with(
        &self,
        proposals: &[Proposal],
        profile: &WeightProfile,
        log_warnings: bool,
    ) -> Result<RankingOutcome, ConfigurationError> {
        let weight_sum = profile.validate(self.policy)?;

        let mut excluded = Vec::new();
        let mut eligible = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            if proposal.status.is_rankable() {
                eligible.push(proposal);
            } else {
                excluded.push(ExcludedProposal {
                    proposal_id: proposal.id.clone(),
                    supplier: proposal.supplier.clone(),
                    reason: ExclusionReason::Disqualified,
                });
            }
        }

        let mut entries: Vec<_> = eligible
            .iter()
            .enumerate()
            .map(|(input_index, proposal)| {
                let score = rules::score_proposal(proposal, profile, weight_sum);
                let candidate = RankingCandidate {
                    input_index,
                    composite_score: score.composite_score,
                    total_value: proposal.total_value,
                };
                (candidate, *proposal, score)
            })
            .collect();
        entries.sort_by(|a, b| compare_candidates(&a.0, &b.0));

        let mut warnings = Vec::new();
        let mut ranked = Vec::with_capacity(entries.len());
        for (position, (_, proposal, score)) in entries.into_iter().enumerate() {
            if log_warnings {
                for warning in &score.warnings {
                    warn!(profile = %profile.id, "{}", warning.describe());
                }
            }

            ranked.push(RankedProposal {
                rank: position as u32 + 1,
                proposal_id: proposal.id.clone(),
                supplier: proposal.supplier.clone(),
                total_value: proposal.total_value,
                status: proposal.status,
                composite_score: score.composite_score,
                components: score.components,
                incomplete: !score.warnings.is_empty(),
            });
            warnings.extend(score.warnings);
        }

        debug!(
            profile = %profile.id,
            ranked = ranked.len(),
            excluded = excluded.len(),
            warnings = warnings.len(),
            "proposals ranked"
        );

        Ok(RankingOutcome {
            profile_id: profile.id.clone(),
            ranked,
            excluded,
            warnings,
        })
    }
}

/// Ranks with the default normalising weight policy.
pub fn rank(
    proposals: &[Proposal],
    profile: &WeightProfile,
) -> Result<RankingOutcome, ConfigurationError> {
    RankingEngine::default().rank(proposals, profile)
}

/// Weighted contribution of one criterion, kept so composites can be audited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub criterion: Criterion,
    pub score: f64,
    pub weight: u32,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProposal {
    pub rank: u32,
    pub proposal_id: ProposalId,
    pub supplier: Supplier,
    pub total_value: Decimal,
    pub status: ProposalStatus,
    pub composite_score: f64,
    pub components: Vec<ScoreComponent>,
    /// Set when at least one weighted criterion was missing or out of range.
    pub incomplete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Disqualified,
}

/// Proposal left out of the ranking; it carries no rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedProposal {
    pub proposal_id: ProposalId,
    pub supplier: Supplier,
    pub reason: ExclusionReason,
}

/// Data-quality diagnostics absorbed by the engine; the operator is expected to review them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    MissingCriterion {
        proposal_id: ProposalId,
        criterion: Criterion,
    },
    ScoreOutOfRange {
        proposal_id: ProposalId,
        criterion: Criterion,
        value: f64,
    },
}

impl DataWarning {
    pub fn proposal_id(&self) -> &ProposalId {
        match self {
            DataWarning::MissingCriterion { proposal_id, .. }
            | DataWarning::ScoreOutOfRange { proposal_id, .. } => proposal_id,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DataWarning::MissingCriterion {
                proposal_id,
                criterion,
            } => format!(
                "proposal {} has no '{}' score; counted as 0",
                proposal_id,
                criterion.key()
            ),
            DataWarning::ScoreOutOfRange {
                proposal_id,
                criterion,
                value,
            } => format!(
                "proposal {} '{}' score {} is outside 0-10; clamped",
                proposal_id,
                criterion.key(),
                value
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingOutcome {
    pub profile_id: String,
    pub ranked: Vec<RankedProposal>,
    pub excluded: Vec<ExcludedProposal>,
    pub warnings: Vec<DataWarning>,
}

impl RankingOutcome {
    pub fn leader(&self) -> Option<&RankedProposal> {
        self.ranked.first()
    }

    pub fn rank_of(&self, proposal_id: &ProposalId) -> Option<u32> {
        self.ranked
            .iter()
            .find(|entry| &entry.proposal_id == proposal_id)
            .map(|entry| entry.rank)
    }
}
