use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::adjudication::{checked_total, AdjudicationError};
use super::domain::{AdjudicatedItem, LotId, LotPlan, Proposal, ProposalId};

/// Savings percentage, or an explicit marker when the estimate cannot be divided by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SavingsRate {
    Applicable(Decimal),
    NotApplicable,
}

impl SavingsRate {
    fn from_amounts(estimated: Decimal, absolute: Decimal) -> Self {
        if estimated <= Decimal::ZERO {
            return SavingsRate::NotApplicable;
        }
        let rate = absolute
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(estimated))
            .or_else(|| {
                absolute
                    .checked_div(estimated)?
                    .checked_mul(Decimal::ONE_HUNDRED)
            });
        match rate {
            Some(value) => SavingsRate::Applicable(value),
            None => SavingsRate::NotApplicable,
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            SavingsRate::Applicable(value) => Some(*value),
            SavingsRate::NotApplicable => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            SavingsRate::Applicable(value) => format!("{:.2}%", value.round_dp(2)),
            SavingsRate::NotApplicable => "N/A".to_string(),
        }
    }
}

/// Economy of an award against the initial estimate. Negative savings are overruns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySummary {
    pub estimated_value: Decimal,
    pub awarded_value: Decimal,
    pub absolute_savings: Decimal,
    pub savings_rate: SavingsRate,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_proposals: Vec<ProposalId>,
}

impl EconomySummary {
    fn from_amounts(estimated: Decimal, awarded: Decimal) -> Result<Self, AdjudicationError> {
        let absolute = estimated
            .checked_sub(awarded)
            .ok_or(AdjudicationError::AmountOverflow("absolute savings"))?;
        Ok(Self {
            estimated_value: estimated,
            awarded_value: awarded,
            absolute_savings: absolute,
            savings_rate: SavingsRate::from_amounts(estimated, absolute),
            excluded_proposals: Vec::new(),
        })
    }

    pub fn is_overrun(&self) -> bool {
        self.absolute_savings < Decimal::ZERO
    }
}

/// Compares the estimate against the proposals actually awarded.
pub fn compute_economy(
    estimated: Decimal,
    awarded: &[Proposal],
) -> Result<EconomySummary, AdjudicationError> {
    let mut total = Decimal::ZERO;
    let mut excluded = Vec::new();
    for proposal in awarded {
        if proposal.status.is_rankable() {
            total = total
                .checked_add(proposal.total_value)
                .ok_or(AdjudicationError::AmountOverflow("awarded value"))?;
        } else {
            warn!(proposal = %proposal.id, "disqualified proposal ignored in economy");
            excluded.push(proposal.id.clone());
        }
    }

    let mut summary = EconomySummary::from_amounts(estimated, total)?;
    summary.excluded_proposals = excluded;
    debug!(
        estimated = %summary.estimated_value,
        awarded = %summary.awarded_value,
        savings = %summary.absolute_savings,
        "economy computed"
    );
    Ok(summary)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotEconomy {
    pub lot_id: LotId,
    pub lot_name: String,
    pub summary: EconomySummary,
}

/// Per-lot economy; `total.absolute_savings` always equals the sum of the lot savings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotEconomyBreakdown {
    pub lots: Vec<LotEconomy>,
    pub total: EconomySummary,
}

pub fn economy_by_lot(
    plans: &[LotPlan],
    items: &[AdjudicatedItem],
) -> Result<LotEconomyBreakdown, AdjudicationError> {
    if let Some(orphan) = items
        .iter()
        .find(|item| !plans.iter().any(|plan| plan.id == item.lot_id))
    {
        return Err(AdjudicationError::LotNotFound(orphan.lot_id.clone()));
    }

    let lots = plans
        .iter()
        .map(|plan| {
            let awarded = checked_total(
                items
                    .iter()
                    .filter(|item| item.lot_id == plan.id)
                    .map(|item| item.total_value),
                "lot awarded value",
            )?;
            Ok(LotEconomy {
                lot_id: plan.id.clone(),
                lot_name: plan.name.clone(),
                summary: EconomySummary::from_amounts(plan.estimated_value, awarded)?,
            })
        })
        .collect::<Result<Vec<_>, AdjudicationError>>()?;

    let estimated = checked_total(
        lots.iter().map(|lot| lot.summary.estimated_value),
        "estimated total",
    )?;
    let awarded = checked_total(
        lots.iter().map(|lot| lot.summary.awarded_value),
        "awarded total",
    )?;

    Ok(LotEconomyBreakdown {
        total: EconomySummary::from_amounts(estimated, awarded)?,
        lots,
    })
}
