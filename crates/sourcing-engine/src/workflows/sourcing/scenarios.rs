use std::collections::BTreeSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::domain::Criterion;

pub const MENOR_PRECO: &str = "menor_preco";
pub const MELHOR_SCORE: &str = "melhor_score";
pub const MELHOR_PRAZO: &str = "melhor_prazo";
pub const TECNICA_E_PRECO: &str = "tecnica_e_preco";
pub const EQUILIBRADO: &str = "equilibrado";

/// How the ranking engine treats profiles whose weights do not add up to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Divide by the weight sum actually used.
    #[default]
    Normalize,
    /// Reject any profile whose weights do not sum to exactly 100.
    Strict,
}

impl WeightPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normalize" | "normalise" => Some(Self::Normalize),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

/// Profile or schema mistakes that must surface to the caller instead of being defaulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("criterion '{0}' is not part of the proposal schema")]
    UnknownCriterion(String),
    #[error("profile '{profile}' lists criterion '{criterion}' more than once")]
    DuplicateCriterion { profile: String, criterion: String },
    #[error("profile '{profile}' has no positive weight")]
    NonPositiveWeightSum { profile: String },
    #[error("profile '{profile}' weights sum to {sum}, expected 100")]
    WeightSumMismatch { profile: String, sum: u32 },
    #[error("profile '{profile}' weights overflow when summed")]
    WeightSumOverflow { profile: String },
    #[error("scenario '{0}' is not a known weight profile")]
    UnknownProfile(String),
}

/// Single (criterion, weight) pair of a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionWeight {
    pub criterion: Criterion,
    pub weight: u32,
}

/// Named weighting ("cenário") used to combine sub-scores into one ranking score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightProfile {
    pub id: String,
    pub name: String,
    pub weights: Vec<CriterionWeight>,
}

impl WeightProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        weights: &[(Criterion, u32)],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weights: weights
                .iter()
                .map(|(criterion, weight)| CriterionWeight {
                    criterion: *criterion,
                    weight: *weight,
                })
                .collect(),
        }
    }

    /// `None` when the weights do not fit in a `u32` sum.
    pub fn weight_sum(&self) -> Option<u32> {
        self.weights
            .iter()
            .try_fold(0u32, |sum, entry| sum.checked_add(entry.weight))
    }

    pub fn weight_of(&self, criterion: Criterion) -> Option<u32> {
        self.weights
            .iter()
            .find(|entry| entry.criterion == criterion)
            .map(|entry| entry.weight)
    }

    /// Returns the weight sum the engine divides by, or why the profile is unusable.
    pub fn validate(&self, policy: WeightPolicy) -> Result<u32, ConfigurationError> {
        let mut seen = BTreeSet::new();
        for entry in &self.weights {
            if !seen.insert(entry.criterion) {
                return Err(ConfigurationError::DuplicateCriterion {
                    profile: self.id.clone(),
                    criterion: entry.criterion.key().to_string(),
                });
            }
        }

        let sum = self
            .weight_sum()
            .ok_or_else(|| ConfigurationError::WeightSumOverflow {
                profile: self.id.clone(),
            })?;
        if sum == 0 {
            return Err(ConfigurationError::NonPositiveWeightSum {
                profile: self.id.clone(),
            });
        }

        if policy == WeightPolicy::Strict && sum != 100 {
            return Err(ConfigurationError::WeightSumMismatch {
                profile: self.id.clone(),
                sum,
            });
        }

        Ok(sum)
    }
}

/// Untyped profile as received from JSON payloads, mirroring the `filtros` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub filtros: Vec<RawWeight>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawWeight {
    pub criterio: String,
    pub peso: u32,
}

impl TryFrom<ProfileDefinition> for WeightProfile {
    type Error = ConfigurationError;

    fn try_from(definition: ProfileDefinition) -> Result<Self, Self::Error> {
        let mut weights = Vec::with_capacity(definition.filtros.len());
        for raw in &definition.filtros {
            let criterion: Criterion = raw.criterio.parse()?;
            if weights
                .iter()
                .any(|entry: &CriterionWeight| entry.criterion == criterion)
            {
                return Err(ConfigurationError::DuplicateCriterion {
                    profile: definition.id.clone(),
                    criterion: criterion.key().to_string(),
                });
            }
            weights.push(CriterionWeight {
                criterion,
                weight: raw.peso,
            });
        }

        let name = definition.name.unwrap_or_else(|| definition.id.clone());
        Ok(Self {
            id: definition.id,
            name,
            weights,
        })
    }
}

static PRESETS: OnceLock<Vec<WeightProfile>> = OnceLock::new();

/// The fixed scenario presets offered on the comparative map.
pub fn presets() -> &'static [WeightProfile] {
    PRESETS.get_or_init(|| {
        use Criterion::*;
        vec![
            WeightProfile::new(MENOR_PRECO, "Menor Preço", &[(Preco, 100)]),
            WeightProfile::new(
                MELHOR_SCORE,
                "Melhor Score Técnico-Comercial",
                &[(Tecnico, 40), (Preco, 35), (Qualidade, 25)],
            ),
            WeightProfile::new(
                MELHOR_PRAZO,
                "Melhor Prazo",
                &[(Prazo, 50), (Preco, 30), (Qualidade, 20)],
            ),
            WeightProfile::new(
                TECNICA_E_PRECO,
                "Técnica e Preço",
                &[(Tecnico, 50), (Preco, 50)],
            ),
            WeightProfile::new(
                EQUILIBRADO,
                "Equilibrado",
                &[
                    (Preco, 20),
                    (Qualidade, 20),
                    (Prazo, 20),
                    (Tecnico, 20),
                    (Comercial, 20),
                ],
            ),
        ]
    })
}

pub fn preset(id: &str) -> Result<&'static WeightProfile, ConfigurationError> {
    let wanted = id.trim();
    presets()
        .iter()
        .find(|profile| profile.id.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ConfigurationError::UnknownProfile(wanted.to_string()))
}
