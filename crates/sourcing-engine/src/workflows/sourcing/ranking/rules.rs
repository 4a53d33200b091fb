use super::super::domain::{Criterion, Proposal};
use super::super::scenarios::WeightProfile;
use super::{DataWarning, ScoreComponent};

const MIN_SCORE: f64 = 0.0;
const MAX_SCORE: f64 = 10.0;

pub(crate) struct ScoredProposal {
    pub composite_score: f64,
    pub components: Vec<ScoreComponent>,
    pub warnings: Vec<DataWarning>,
}

/// Weighted mean of the profile's criteria; `weight_sum` has already been validated as non-zero.
pub(crate) fn score_proposal(
    proposal: &Proposal,
    profile: &WeightProfile,
    weight_sum: u32,
) -> ScoredProposal {
    let mut components = Vec::with_capacity(profile.weights.len());
    let mut warnings = Vec::new();
    let mut weighted_total = 0.0;

    for entry in &profile.weights {
        let score = effective_score(proposal, entry.criterion, entry.weight, &mut warnings);
        let contribution = score * f64::from(entry.weight);
        weighted_total += contribution;

        components.push(ScoreComponent {
            criterion: entry.criterion,
            score,
            weight: entry.weight,
            contribution: contribution / f64::from(weight_sum),
        });
    }

    ScoredProposal {
        composite_score: weighted_total / f64::from(weight_sum),
        components,
        warnings,
    }
}

fn effective_score(
    proposal: &Proposal,
    criterion: Criterion,
    weight: u32,
    warnings: &mut Vec<DataWarning>,
) -> f64 {
    match proposal.score(criterion) {
        Some(value) if value.is_finite() => {
            if (MIN_SCORE..=MAX_SCORE).contains(&value) {
                value
            } else {
                warnings.push(DataWarning::ScoreOutOfRange {
                    proposal_id: proposal.id.clone(),
                    criterion,
                    value,
                });
                value.clamp(MIN_SCORE, MAX_SCORE)
            }
        }
        _ => {
            // zero-weight gaps do not change the composite, so they stay silent
            if weight > 0 {
                warnings.push(DataWarning::MissingCriterion {
                    proposal_id: proposal.id.clone(),
                    criterion,
                });
            }
            0.0
        }
    }
}
