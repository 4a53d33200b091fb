use rust_decimal::Decimal;

use super::super::domain::Proposal;
use super::super::economy::EconomySummary;
use super::super::ranking::RankingOutcome;
use super::views::{ComparativeInsights, ScenarioStanding};

const NEGOTIATION_PREMIUM_PCT: Decimal = Decimal::TEN;

fn percent_over(value: Decimal, base: Decimal) -> Option<Decimal> {
    if base.is_zero() {
        return None;
    }
    value
        .checked_sub(base)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(base)
        .map(|pct| pct.round_dp(2))
}

pub(crate) fn generate_insights(
    proposals: &[Proposal],
    ranking: &RankingOutcome,
    scenarios: &[ScenarioStanding],
    provisional_economy: Option<&EconomySummary>,
) -> ComparativeInsights {
    let eligible: Vec<&Proposal> = proposals
        .iter()
        .filter(|proposal| proposal.status.is_rankable())
        .collect();

    // min_by_key keeps the first of equal bids, matching the ranking's input-order tie-break
    let cheapest = eligible.iter().min_by_key(|proposal| proposal.total_value);
    let lowest_bid = cheapest.map(|proposal| proposal.total_value);
    let highest_bid = eligible.iter().map(|proposal| proposal.total_value).max();
    let average_bid = if eligible.is_empty() {
        None
    } else {
        eligible
            .iter()
            .try_fold(Decimal::ZERO, |total, proposal| {
                total.checked_add(proposal.total_value)
            })
            .and_then(|total| total.checked_div(Decimal::from(eligible.len())))
            .map(|avg| avg.round_dp(2))
    };
    let price_spread_pct = match (lowest_bid, highest_bid) {
        (Some(low), Some(high)) => percent_over(high, low),
        _ => None,
    };

    let leader = ranking.leader();
    let leader_premium_pct = match (leader, lowest_bid) {
        (Some(entry), Some(low)) => percent_over(entry.total_value, low),
        _ => None,
    };

    let scenario_consensus = match scenarios.first().and_then(|first| first.leader.as_ref()) {
        Some(first) => scenarios
            .iter()
            .all(|standing| standing.leader.as_ref() == Some(first)),
        None => false,
    };

    let mut observations = Vec::new();
    observations.push(format!(
        "{} proposal(s) ranked under {}, {} disqualified",
        ranking.ranked.len(),
        ranking.profile_id,
        ranking.excluded.len()
    ));

    if !ranking.warnings.is_empty() {
        let mut affected: Vec<_> = ranking
            .warnings
            .iter()
            .map(|warning| warning.proposal_id())
            .collect();
        affected.dedup();
        observations.push(format!(
            "{} data-quality warning(s) across {} proposal(s)",
            ranking.warnings.len(),
            affected.len()
        ));
    }

    if let Some(spread) = price_spread_pct {
        observations.push(format!(
            "Bids vary by {:.2}% between lowest and highest",
            spread
        ));
    }

    let leader_is_cheapest = match (leader, cheapest) {
        (Some(entry), Some(proposal)) => entry.total_value == proposal.total_value,
        _ => false,
    };
    if let Some(entry) = leader {
        if leader_is_cheapest {
            observations.push(format!(
                "Leader {} is also the lowest bid",
                entry.supplier.legal_name
            ));
        } else if let Some(premium) = leader_premium_pct {
            observations.push(format!(
                "Leader {} costs {:.2}% more than the lowest bid",
                entry.supplier.legal_name, premium
            ));
        }
    }

    if scenario_consensus {
        if let Some(name) = scenarios
            .first()
            .and_then(|standing| standing.leader_supplier.as_ref())
        {
            observations.push(format!(
                "All {} scenarios agree on {}",
                scenarios.len(),
                name
            ));
        }
    } else if scenarios.len() > 1 {
        let leaders: Vec<String> = scenarios
            .iter()
            .filter_map(|standing| {
                standing
                    .leader_supplier
                    .as_ref()
                    .map(|name| format!("{}: {}", standing.profile_id, name))
            })
            .collect();
        if !leaders.is_empty() {
            observations.push(format!("Scenario leaders differ ({})", leaders.join(", ")));
        }
    }

    let mut recommended_actions: Vec<String> = Vec::new();
    if ranking.ranked.is_empty() {
        recommended_actions
            .push("No classified proposals; reopen the event or review disqualifications".into());
    }
    if !ranking.warnings.is_empty() {
        recommended_actions.push("Complete missing scores before finalizing the award".into());
    }
    if !scenario_consensus && !ranking.ranked.is_empty() {
        recommended_actions
            .push("Confirm the weight profile with stakeholders; scenario leaders differ".into());
    }
    if let (Some(entry), Some(premium)) = (leader, leader_premium_pct) {
        if premium > NEGOTIATION_PREMIUM_PCT {
            recommended_actions.push(format!(
                "Negotiate with {} to narrow the {:.2}% gap to the lowest bid",
                entry.supplier.legal_name, premium
            ));
        }
    }
    if provisional_economy.is_some_and(EconomySummary::is_overrun) {
        recommended_actions
            .push("Leading bid exceeds the estimate; justify the overrun or renegotiate".into());
    }

    ComparativeInsights {
        lowest_bid,
        highest_bid,
        average_bid,
        price_spread_pct,
        leader: leader.map(|entry| entry.proposal_id.clone()),
        cheapest: cheapest.map(|proposal| proposal.id.clone()),
        leader_premium_pct,
        scenario_consensus,
        observations,
        recommended_actions,
    }
}
