mod insights;
mod summary;
pub mod views;

pub use summary::{ComparativeMap, ComparativeMapError};
pub use views::{ComparativeInsights, ScenarioRank, ScenarioStanding};
