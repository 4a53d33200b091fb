//! Comparative scoring and adjudication of supplier proposals.

pub mod adjudication;
pub mod defaults;
pub mod domain;
pub mod economy;
pub mod premiacao;
pub mod ranking;
pub mod report;
pub mod scenarios;

pub use adjudication::{aggregate, build_lots, AdjudicationBoard, AdjudicationError, SupplierAward};
pub use defaults::{resolve_defaults, SourcingDefaults};
pub use domain::{
    AdjudicatedItem, Criterion, EventId, EventType, ItemId, Lot, LotId, LotPlan, LotStatus,
    Proposal, ProposalId, ProposalStatus, Supplier,
};
pub use economy::{
    compute_economy, economy_by_lot, EconomySummary, LotEconomy, LotEconomyBreakdown, SavingsRate,
};
pub use ranking::{
    rank, DataWarning, ExcludedProposal, ExclusionReason, RankedProposal, RankingEngine,
    RankingOutcome, ScoreComponent,
};
pub use report::{ComparativeInsights, ComparativeMap, ComparativeMapError, ScenarioStanding};
pub use scenarios::{
    preset, presets, ConfigurationError, CriterionWeight, ProfileDefinition, WeightPolicy,
    WeightProfile,
};
