use std::sync::OnceLock;

use serde::Serialize;
use tracing::debug;

use super::domain::{fold_label, EventType};
use super::scenarios::{
    self, ConfigurationError, WeightProfile, EQUILIBRADO, MELHOR_PRAZO, MELHOR_SCORE, MENOR_PRECO,
    TECNICA_E_PRECO,
};

const ANY: &str = "*";

struct DefaultsRule {
    sector: &'static str,
    category: &'static str,
    client: &'static str,
    event_type: EventType,
    profile: &'static str,
    rationale: &'static str,
}

impl DefaultsRule {
    fn matches(&self, sector: &str, category: &str, client: &str) -> bool {
        field_matches(self.sector, sector)
            && field_matches(self.category, category)
            && field_matches(self.client, client)
    }

    fn specificity(&self) -> usize {
        [self.sector, self.category, self.client]
            .iter()
            .filter(|field| **field != ANY)
            .count()
    }
}

fn field_matches(rule: &str, value: &str) -> bool {
    rule == ANY || rule == value
}

/// Event format and weight profile suggested to the buyer when a sourcing event is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourcingDefaults {
    pub event_type: EventType,
    pub event_type_label: &'static str,
    pub profile: WeightProfile,
    pub rationale: &'static str,
}

static RULES: OnceLock<Vec<DefaultsRule>> = OnceLock::new();

fn rules() -> &'static [DefaultsRule] {
    RULES.get_or_init(|| {
        vec![
            DefaultsRule {
                sector: "tecnologia",
                category: "software",
                client: ANY,
                event_type: EventType::Rfp,
                profile: MELHOR_SCORE,
                rationale: "Software purchases are judged mainly on technical fit",
            },
            DefaultsRule {
                sector: "tecnologia",
                category: ANY,
                client: ANY,
                event_type: EventType::Rfp,
                profile: TECNICA_E_PRECO,
                rationale: "Technology sourcing balances technical score and price",
            },
            DefaultsRule {
                sector: "industria",
                category: "materia_prima",
                client: ANY,
                event_type: EventType::LeilaoReverso,
                profile: MENOR_PRECO,
                rationale: "Commodity inputs are bought by reverse auction on price",
            },
            DefaultsRule {
                sector: "industria",
                category: ANY,
                client: ANY,
                event_type: EventType::Rfq,
                profile: EQUILIBRADO,
                rationale: "Industrial categories weigh every criterion evenly",
            },
            DefaultsRule {
                sector: "servicos",
                category: "consultoria",
                client: ANY,
                event_type: EventType::Rfp,
                profile: TECNICA_E_PRECO,
                rationale: "Consulting is awarded on technique and price",
            },
            DefaultsRule {
                sector: "saude",
                category: ANY,
                client: ANY,
                event_type: EventType::Rfp,
                profile: MELHOR_SCORE,
                rationale: "Healthcare suppliers must clear quality and technical review",
            },
            DefaultsRule {
                sector: ANY,
                category: "logistica",
                client: ANY,
                event_type: EventType::Rfq,
                profile: MELHOR_PRAZO,
                rationale: "Logistics contracts are driven by delivery lead time",
            },
            DefaultsRule {
                sector: ANY,
                category: "mro",
                client: ANY,
                event_type: EventType::LeilaoReverso,
                profile: MENOR_PRECO,
                rationale: "MRO spend is standardised and bought on price",
            },
            DefaultsRule {
                sector: ANY,
                category: ANY,
                client: "governo",
                event_type: EventType::Rfq,
                profile: MENOR_PRECO,
                rationale: "Public-sector clients require lowest-price adjudication",
            },
            DefaultsRule {
                sector: ANY,
                category: "pesquisa_de_mercado",
                client: ANY,
                event_type: EventType::Rfi,
                profile: EQUILIBRADO,
                rationale: "Market research starts with an information request",
            },
        ]
    })
}

const FALLBACK_EVENT: EventType = EventType::Rfq;
const FALLBACK_PROFILE: &str = MENOR_PRECO;
const FALLBACK_RATIONALE: &str = "No rule matched; quotation on lowest price";

/// Looks up the most specific rule for a sector, category and optional client.
pub fn resolve_defaults(
    sector: &str,
    category: &str,
    client: Option<&str>,
) -> Result<SourcingDefaults, ConfigurationError> {
    let sector = fold_label(sector);
    let category = fold_label(category);
    let client = client.map(fold_label).unwrap_or_default();

    let mut best: Option<&DefaultsRule> = None;
    for rule in rules() {
        if !rule.matches(&sector, &category, &client) {
            continue;
        }
        // first rule wins among equally specific matches
        if best.map_or(true, |current| rule.specificity() > current.specificity()) {
            best = Some(rule);
        }
    }

    let (event_type, profile_id, rationale) = match best {
        Some(rule) => (rule.event_type, rule.profile, rule.rationale),
        None => (FALLBACK_EVENT, FALLBACK_PROFILE, FALLBACK_RATIONALE),
    };
    let profile = scenarios::preset(profile_id)?.clone();

    debug!(
        %sector,
        %category,
        %client,
        event_type = event_type.label(),
        profile = %profile.id,
        "sourcing defaults resolved"
    );

    Ok(SourcingDefaults {
        event_type,
        event_type_label: event_type.label(),
        profile,
        rationale,
    })
}
