use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{
    AdjudicatedItem, ItemId, Lot, LotId, LotPlan, LotStatus, Proposal, ProposalId, Supplier,
};

/// Integrity failures in adjudication inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdjudicationError {
    #[error("proposal {0} is disqualified and cannot be awarded")]
    DisqualifiedWinner(ProposalId),
    #[error("item {item} is awarded to {tax_id}, who has no winning proposal")]
    UnknownWinner { item: ItemId, tax_id: String },
    #[error("lot {0} was not declared for this event")]
    LotNotFound(LotId),
    #[error("item {0} does not exist")]
    ItemNotFound(ItemId),
    #[error("lot {0} is already finalized")]
    LotFinalized(LotId),
    #[error("lot {lot} cannot be finalized while {status}")]
    LotNotAdjudicated { lot: LotId, status: &'static str },
    #[error("{0} exceeds the representable money range")]
    AmountOverflow(&'static str),
}

/// Exact sum of `values`, or `AmountOverflow` naming what was being totalled.
pub(crate) fn checked_total(
    values: impl IntoIterator<Item = Decimal>,
    what: &'static str,
) -> Result<Decimal, AdjudicationError> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
        .ok_or(AdjudicationError::AmountOverflow(what))
}

/// A winning supplier's share of the awarded value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierAward {
    pub supplier: Supplier,
    pub proposal_id: ProposalId,
    pub total_value: Decimal,
    pub participation_pct: Decimal,
    pub item_count: usize,
    pub lots: Vec<LotId>,
}

/// Groups awarded items by winning supplier and derives each supplier's participation.
pub fn aggregate(
    winners: &[Proposal],
    items: &[AdjudicatedItem],
) -> Result<Vec<SupplierAward>, AdjudicationError> {
    if let Some(disqualified) = winners.iter().find(|winner| !winner.status.is_rankable()) {
        return Err(AdjudicationError::DisqualifiedWinner(disqualified.id.clone()));
    }

    let mut awards: Vec<SupplierAward> = Vec::new();
    let mut lots: Vec<BTreeSet<LotId>> = Vec::new();
    for item in items {
        let position = match awards
            .iter()
            .position(|award| award.supplier.same_company(&item.winner))
        {
            Some(position) => position,
            None => {
                let winner = winners
                    .iter()
                    .find(|winner| winner.supplier.same_company(&item.winner))
                    .ok_or_else(|| AdjudicationError::UnknownWinner {
                        item: item.id.clone(),
                        tax_id: item.winner.tax_id.clone(),
                    })?;
                awards.push(SupplierAward {
                    supplier: winner.supplier.clone(),
                    proposal_id: winner.id.clone(),
                    total_value: Decimal::ZERO,
                    participation_pct: Decimal::ZERO,
                    item_count: 0,
                    lots: Vec::new(),
                });
                lots.push(BTreeSet::new());
                awards.len() - 1
            }
        };

        let award = &mut awards[position];
        award.total_value = award
            .total_value
            .checked_add(item.total_value)
            .ok_or(AdjudicationError::AmountOverflow("supplier award total"))?;
        award.item_count += 1;
        lots[position].insert(item.lot_id.clone());
    }

    let grand_total = checked_total(
        awards.iter().map(|award| award.total_value),
        "awarded grand total",
    )?;
    for (award, lot_ids) in awards.iter_mut().zip(lots) {
        award.lots = lot_ids.into_iter().collect();
        award.participation_pct = participation(award.total_value, grand_total);
    }

    awards.sort_by(|a, b| {
        b.total_value
            .cmp(&a.total_value)
            .then_with(|| a.supplier.legal_name.cmp(&b.supplier.legal_name))
    });

    debug!(
        suppliers = awards.len(),
        total = %grand_total,
        "adjudication aggregated"
    );

    Ok(awards)
}

fn participation(value: Decimal, grand_total: Decimal) -> Decimal {
    if grand_total.is_zero() {
        return Decimal::ZERO;
    }
    value
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(grand_total))
        .or_else(|| {
            value
                .checked_div(grand_total)?
                .checked_mul(Decimal::ONE_HUNDRED)
        })
        .unwrap_or(Decimal::ZERO)
}

/// Derives lot totals, winners and status from the declared plans and the awarded items.
pub fn build_lots(
    plans: &[LotPlan],
    items: &[AdjudicatedItem],
) -> Result<Vec<Lot>, AdjudicationError> {
    if let Some(orphan) = items
        .iter()
        .find(|item| !plans.iter().any(|plan| plan.id == item.lot_id))
    {
        return Err(AdjudicationError::LotNotFound(orphan.lot_id.clone()));
    }

    plans
        .iter()
        .map(|plan| {
            let lot_items: Vec<&AdjudicatedItem> =
                items.iter().filter(|item| item.lot_id == plan.id).collect();
            let total_value = checked_total(
                lot_items.iter().map(|item| item.total_value),
                "lot total",
            )?;
            let winner = match lot_items.split_first() {
                Some((first, rest))
                    if rest.iter().all(|item| item.winner.same_company(&first.winner)) =>
                {
                    Some(first.winner.clone())
                }
                _ => None,
            };
            let status = if lot_items.is_empty() {
                LotStatus::Pendente
            } else {
                LotStatus::Adjudicado
            };

            Ok(Lot {
                id: plan.id.clone(),
                name: plan.name.clone(),
                estimated_value: plan.estimated_value,
                total_value,
                item_count: lot_items.len(),
                winner,
                criterion: plan.criterion.clone(),
                status,
            })
        })
        .collect()
}

/// Working snapshot of an event's adjudication: items can move between suppliers until
/// their lot is finalized, and lot totals are always rebuilt from the items.
#[derive(Debug, Clone)]
pub struct AdjudicationBoard {
    plans: Vec<LotPlan>,
    items: Vec<AdjudicatedItem>,
    finalized: BTreeSet<LotId>,
    lots: Vec<Lot>,
}

impl AdjudicationBoard {
    pub fn new(
        plans: Vec<LotPlan>,
        items: Vec<AdjudicatedItem>,
    ) -> Result<Self, AdjudicationError> {
        let lots = build_lots(&plans, &items)?;
        Ok(Self {
            plans,
            items,
            finalized: BTreeSet::new(),
            lots,
        })
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn items(&self) -> &[AdjudicatedItem] {
        &self.items
    }

    pub fn plans(&self) -> &[LotPlan] {
        &self.plans
    }

    pub fn lot(&self, lot_id: &LotId) -> Option<&Lot> {
        self.lots.iter().find(|lot| &lot.id == lot_id)
    }

    /// Moves an item to another supplier.
    pub fn reassign_item(
        &mut self,
        item_id: &ItemId,
        supplier: Supplier,
    ) -> Result<&Lot, AdjudicationError> {
        let index = self
            .items
            .iter()
            .position(|item| &item.id == item_id)
            .ok_or_else(|| AdjudicationError::ItemNotFound(item_id.clone()))?;

        let lot_id = self.items[index].lot_id.clone();
        if self.finalized.contains(&lot_id) {
            return Err(AdjudicationError::LotFinalized(lot_id));
        }

        self.items[index].winner = supplier;
        self.rebuild()?;
        self.lot(&lot_id)
            .ok_or(AdjudicationError::LotNotFound(lot_id))
    }

    pub fn finalize_lot(&mut self, lot_id: &LotId) -> Result<&Lot, AdjudicationError> {
        let lot = self
            .lot(lot_id)
            .ok_or_else(|| AdjudicationError::LotNotFound(lot_id.clone()))?;
        match lot.status {
            LotStatus::Adjudicado => {}
            LotStatus::Finalizado => return Err(AdjudicationError::LotFinalized(lot_id.clone())),
            LotStatus::Pendente => {
                return Err(AdjudicationError::LotNotAdjudicated {
                    lot: lot_id.clone(),
                    status: lot.status.label(),
                })
            }
        }

        self.finalized.insert(lot_id.clone());
        self.rebuild()?;
        self.lot(lot_id)
            .ok_or_else(|| AdjudicationError::LotNotFound(lot_id.clone()))
    }

    /// Finalizes every adjudicated lot that is still open.
    pub fn finalize_all(&mut self) -> Result<&[Lot], AdjudicationError> {
        for lot in &self.lots {
            if lot.status == LotStatus::Adjudicado {
                self.finalized.insert(lot.id.clone());
            }
        }
        self.rebuild()?;
        Ok(&self.lots)
    }

    fn rebuild(&mut self) -> Result<(), AdjudicationError> {
        let mut lots = build_lots(&self.plans, &self.items)?;
        for lot in &mut lots {
            if self.finalized.contains(&lot.id) {
                lot.status = LotStatus::Finalizado;
            }
        }
        self.lots = lots;
        Ok(())
    }

    pub fn into_parts(self) -> (Vec<LotPlan>, Vec<AdjudicatedItem>, Vec<Lot>) {
        (self.plans, self.items, self.lots)
    }
}
