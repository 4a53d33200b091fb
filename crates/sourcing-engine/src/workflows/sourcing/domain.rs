use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::scenarios::ConfigurationError;

/// Identifier wrapper for a supplier proposal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub String);

/// Identifier wrapper for a sourcing event (RFI/RFP/RFQ/reverse auction).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

/// Identifier wrapper for a lot ("lote").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LotId(pub String);

/// Identifier wrapper for an adjudicated line item.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplier identity; two suppliers are the same company when their tax ids match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(alias = "razaoSocial")]
    pub legal_name: String,
    #[serde(alias = "cnpj")]
    pub tax_id: String,
}

impl Supplier {
    pub fn new(legal_name: impl Into<String>, tax_id: impl Into<String>) -> Self {
        Self {
            legal_name: legal_name.into(),
            tax_id: tax_id.into(),
        }
    }

    pub fn same_company(&self, other: &Supplier) -> bool {
        self.tax_id == other.tax_id
    }
}

/// Evaluation criteria scored on a 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Preco,
    Qualidade,
    Prazo,
    Tecnico,
    Comercial,
}

impl Criterion {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Preco,
            Self::Qualidade,
            Self::Prazo,
            Self::Tecnico,
            Self::Comercial,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Preco => "preco",
            Self::Qualidade => "qualidade",
            Self::Prazo => "prazo",
            Self::Tecnico => "tecnico",
            Self::Comercial => "comercial",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Preco => "Preço",
            Self::Qualidade => "Qualidade",
            Self::Prazo => "Prazo de Entrega",
            Self::Tecnico => "Técnico",
            Self::Comercial => "Comercial",
        }
    }
}

impl FromStr for Criterion {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let folded = fold_label(value);
        Criterion::ordered()
            .into_iter()
            .find(|criterion| criterion.key() == folded)
            .ok_or_else(|| ConfigurationError::UnknownCriterion(value.trim().to_string()))
    }
}

/// Lowercases a label and strips the Portuguese diacritics used in spreadsheet headers.
pub(crate) fn fold_label(value: &str) -> String {
    value
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            ' ' | '-' => '_',
            other => other,
        })
        .collect()
}

/// Classification state of a proposal, independent of its rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Classificada,
    Desclassificada,
    EmAnalise,
}

impl ProposalStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Classificada => "classificada",
            Self::Desclassificada => "desclassificada",
            Self::EmAnalise => "em_analise",
        }
    }

    /// Disqualified proposals never take part in ranking or adjudication.
    pub const fn is_rankable(self) -> bool {
        !matches!(self, Self::Desclassificada)
    }
}

/// A supplier's bid as captured once the response window closes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(alias = "fornecedor")]
    pub supplier: Supplier,
    #[serde(alias = "valorTotal")]
    pub total_value: Decimal,
    #[serde(default, alias = "criterios")]
    pub criteria: BTreeMap<Criterion, f64>,
    #[serde(default)]
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn score(&self, criterion: Criterion) -> Option<f64> {
        self.criteria.get(&criterion).copied()
    }
}

/// Lifecycle of a lot during adjudication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LotStatus {
    Pendente,
    Adjudicado,
    Finalizado,
}

impl LotStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pendente => "Pendente",
            Self::Adjudicado => "Adjudicado",
            Self::Finalizado => "Finalizado",
        }
    }
}

/// Lot declared by the buyer before adjudication, carrying its estimated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotPlan {
    pub id: LotId,
    pub name: String,
    #[serde(alias = "valorEstimado")]
    pub estimated_value: Decimal,
    #[serde(default)]
    pub criterion: Option<String>,
}

/// Lot state derived from its plan and the items currently awarded to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: LotId,
    pub name: String,
    pub estimated_value: Decimal,
    pub total_value: Decimal,
    pub item_count: usize,
    /// `None` while the lot has no items or its items are split across suppliers.
    pub winner: Option<Supplier>,
    pub criterion: Option<String>,
    pub status: LotStatus,
}

/// Line item awarded to a winning supplier inside a lot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicatedItem {
    pub id: ItemId,
    pub lot_id: LotId,
    #[serde(alias = "fornecedor")]
    pub winner: Supplier,
    #[serde(default)]
    pub description: String,
    pub quantity: Decimal,
    pub unit_value: Decimal,
    pub total_value: Decimal,
    #[serde(default)]
    pub criterion: Option<String>,
}

impl AdjudicatedItem {
    /// Builds an item whose line total is `quantity * unit_value`.
    pub fn priced(
        id: impl Into<String>,
        lot_id: impl Into<String>,
        winner: Supplier,
        description: impl Into<String>,
        quantity: Decimal,
        unit_value: Decimal,
    ) -> Self {
        Self {
            id: ItemId(id.into()),
            lot_id: LotId(lot_id.into()),
            winner,
            description: description.into(),
            quantity,
            unit_value,
            total_value: quantity * unit_value,
            criterion: None,
        }
    }

    pub fn with_criterion(mut self, criterion: impl Into<String>) -> Self {
        self.criterion = Some(criterion.into());
        self
    }
}

/// Competitive event formats supported by the sourcing wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Rfi,
    Rfp,
    Rfq,
    LeilaoReverso,
}

impl EventType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rfi => "RFI",
            Self::Rfp => "RFP",
            Self::Rfq => "RFQ",
            Self::LeilaoReverso => "Leilão Reverso",
        }
    }
}
