//! Premiação stage: the comparative map, award finalization and their HTTP surface.
//!
//! Scoring, economy and adjudication math all comes from the sibling engines; this module
//! only sequences them, persists the finalized award and notifies the operator.

pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use repository::{
    AwardRecord, AwardRepository, Notification, NotificationError, NotificationPublisher,
    RepositoryError,
};
pub use router::premiacao_router;
pub use service::{
    AdjudicationReport, AdjudicationRequest, ComparativeMapRequest, DefaultsRequest,
    EconomyReport, EconomyRequest, FinalizationRequest, PremiacaoService, PremiacaoServiceError,
    ProfileSelector, RankingRequest, ScenarioCatalog, FINALIZED_TEMPLATE, OVERRUN_TEMPLATE,
};
