use crate::infra::{parse_decimal, InMemoryAwardRepository, InMemoryNotificationPublisher};
use chrono::Local;
use clap::Args;
use rust_decimal::Decimal;
use sourcing_engine::config::{AppConfig, ScoringConfig};
use sourcing_engine::error::AppError;
use sourcing_engine::workflows::planilha::ProposalCsvImporter;
use sourcing_engine::workflows::sourcing::premiacao::{
    ComparativeMapRequest, FinalizationRequest, PremiacaoService, PremiacaoServiceError,
    ProfileSelector,
};
use sourcing_engine::workflows::sourcing::{
    preset, presets, resolve_defaults, AdjudicatedItem, ComparativeMap, Criterion, EventId,
    LotId, LotPlan, Proposal, ProposalId, ProposalStatus, Supplier,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct RankingReportArgs {
    /// Proposals CSV export (comma or semicolon separated)
    #[arg(long)]
    pub(crate) proposals_csv: PathBuf,
    /// Weighting scenario id (defaults to the configured profile)
    #[arg(long)]
    pub(crate) profile: Option<String>,
    /// Estimated event value used for the provisional economy
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) estimated: Option<Decimal>,
    /// Print the comparative map as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DefaultsArgs {
    /// Business sector, e.g. "Tecnologia"
    #[arg(long)]
    pub(crate) sector: String,
    /// Purchase category, e.g. "Software"
    #[arg(long)]
    pub(crate) category: String,
    /// Optional client segment, e.g. "Governo"
    #[arg(long)]
    pub(crate) client: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Weighting scenario for the comparative map
    #[arg(long)]
    pub(crate) profile: Option<String>,
    /// Stop after the comparative map without finalizing the award
    #[arg(long)]
    pub(crate) skip_finalization: bool,
}

pub(crate) fn run_ranking_report(args: RankingReportArgs) -> Result<(), AppError> {
    let RankingReportArgs {
        proposals_csv,
        profile,
        estimated,
        json,
    } = args;

    let scoring = AppConfig::load()?.scoring;
    let proposals = ProposalCsvImporter::from_path(&proposals_csv)?;
    let profile_id = profile.unwrap_or_else(|| scoring.default_profile.clone());
    let profile = preset(&profile_id).map_err(PremiacaoServiceError::from)?;
    let map = ComparativeMap::build(&proposals, profile, estimated, scoring.weight_policy)
        .map_err(PremiacaoServiceError::from)?;

    if json {
        match serde_json::to_string_pretty(&map) {
            Ok(rendered) => println!("{}", rendered),
            Err(err) => println!("Comparative map unavailable: {}", err),
        }
    } else {
        println!(
            "Comparative map for {} ({} proposals)",
            proposals_csv.display(),
            proposals.len()
        );
        render_comparative_map(&map);
    }

    Ok(())
}

pub(crate) fn run_scenarios() -> Result<(), AppError> {
    println!("Weighting scenarios");
    for profile in presets() {
        let weights: Vec<String> = profile
            .weights
            .iter()
            .map(|entry| format!("{} {}%", entry.criterion.label(), entry.weight))
            .collect();
        println!("- {} ({}): {}", profile.name, profile.id, weights.join(", "));
    }
    Ok(())
}

pub(crate) fn run_defaults(args: DefaultsArgs) -> Result<(), AppError> {
    let defaults = resolve_defaults(&args.sector, &args.category, args.client.as_deref())
        .map_err(PremiacaoServiceError::from)?;
    println!(
        "Suggested event type: {} | scenario: {} ({})",
        defaults.event_type_label, defaults.profile.name, defaults.profile.id
    );
    println!("Rationale: {}", defaults.rationale);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        profile,
        skip_finalization,
    } = args;

    println!("Sourcing demo: notebooks and support services");
    let repository = Arc::new(InMemoryAwardRepository::default());
    let notifications = Arc::new(InMemoryNotificationPublisher::default());
    let service = PremiacaoService::new(repository, notifications.clone(), ScoringConfig::default());
    let event_id = EventId(format!("evt-{}", Local::now().format("%Y%m%d")));

    run_demo_event(&service, &notifications, &event_id, profile, skip_finalization)
}

type DemoService = PremiacaoService<InMemoryAwardRepository, InMemoryNotificationPublisher>;

fn run_demo_event(
    service: &DemoService,
    notifications: &InMemoryNotificationPublisher,
    event_id: &EventId,
    profile: Option<String>,
    skip_finalization: bool,
) -> Result<(), AppError> {
    let proposals = demo_proposals();
    let lots = demo_lots();
    let estimated: Decimal = lots.iter().map(|lot| lot.estimated_value).sum();
    let map = service.comparative_map(ComparativeMapRequest {
        proposals: proposals.clone(),
        profile: profile.map(ProfileSelector::Preset),
        estimated_value: Some(estimated),
    })?;
    render_comparative_map(&map);

    if skip_finalization {
        return Ok(());
    }

    let winners: Vec<Proposal> = proposals
        .into_iter()
        .filter(|proposal| proposal.id.0 != "p-global")
        .collect();
    let record = service.finalize(
        event_id,
        FinalizationRequest {
            approver: "Marina Costa".to_string(),
            winners,
            lots,
            items: demo_items(),
            estimated_value: None,
            notes: Some("Demo award".to_string()),
        },
    )?;

    println!("\nPremiação {} finalized by {}", record.event_id, record.approver);
    for award in &record.awards {
        println!(
            "- {}: {} across {} item(s), {:.2}% of the award",
            award.supplier.legal_name, award.total_value, award.item_count, award.participation_pct
        );
    }
    for lot in &record.lot_economy.lots {
        println!(
            "  {} ({}): estimated {} | awarded {} | savings {}",
            lot.lot_name,
            lot.lot_id,
            lot.summary.estimated_value,
            lot.summary.awarded_value,
            lot.summary.savings_rate.label()
        );
    }
    println!("  Total: {}", record.summary_line());

    let events = notifications.events();
    if events.is_empty() {
        println!("  Notifications: none dispatched");
    } else {
        println!("  Notifications:");
        for event in events {
            println!("    - template={} -> {}", event.template, event.event_id);
        }
    }

    Ok(())
}

pub(crate) fn render_comparative_map(map: &ComparativeMap) {
    println!("Scenario: {} ({})", map.profile_name, map.profile_id);
    for entry in &map.ranking.ranked {
        println!(
            "  {}. {} | {} | score {:.3}",
            entry.rank, entry.supplier.legal_name, entry.total_value, entry.composite_score
        );
    }
    for excluded in &map.ranking.excluded {
        println!("  -  {} (disqualified)", excluded.supplier.legal_name);
    }
    for warning in &map.ranking.warnings {
        println!("  ! {}", warning.describe());
    }

    println!("Scenario leaders:");
    for standing in &map.scenarios {
        println!(
            "  - {}: {}",
            standing.profile_name,
            standing.leader_supplier.as_deref().unwrap_or("no eligible proposal")
        );
    }

    if let Some(economy) = &map.provisional_economy {
        println!(
            "Provisional economy: estimated {} | leader bid {} | savings {} ({})",
            economy.estimated_value,
            economy.awarded_value,
            economy.absolute_savings,
            economy.savings_rate.label()
        );
    }
    for observation in &map.insights.observations {
        println!("* {}", observation);
    }
    for action in &map.insights.recommended_actions {
        println!("> {}", action);
    }
}

fn demo_supplier(index: usize) -> Supplier {
    match index {
        0 => Supplier::new("TechCorp Soluções Ltda", "12.345.678/0001-90"),
        1 => Supplier::new("InnovaTech Sistemas S.A.", "23.456.789/0001-01"),
        _ => Supplier::new("Global Supply Comércio", "34.567.890/0001-12"),
    }
}

fn demo_proposal(id: &str, supplier: Supplier, value: i64, scores: [f64; 5]) -> Proposal {
    let criteria: BTreeMap<Criterion, f64> =
        Criterion::ordered().into_iter().zip(scores).collect();
    Proposal {
        id: ProposalId(id.to_string()),
        supplier,
        total_value: Decimal::new(value, 0),
        criteria,
        status: ProposalStatus::Classificada,
    }
}

fn demo_proposals() -> Vec<Proposal> {
    vec![
        demo_proposal("p-techcorp", demo_supplier(0), 145_000, [8.5, 9.0, 8.0, 9.2, 8.8]),
        demo_proposal("p-innovatech", demo_supplier(1), 138_000, [9.0, 8.5, 7.0, 8.0, 8.5]),
        demo_proposal("p-global", demo_supplier(2), 162_000, [7.0, 8.8, 9.5, 8.5, 7.8]),
    ]
}

fn demo_lots() -> Vec<LotPlan> {
    vec![
        LotPlan {
            id: LotId("lote-1".to_string()),
            name: "Hardware".to_string(),
            estimated_value: Decimal::new(160_000, 0),
            criterion: Some("melhor_score".to_string()),
        },
        LotPlan {
            id: LotId("lote-2".to_string()),
            name: "Serviços de suporte".to_string(),
            estimated_value: Decimal::new(150_000, 0),
            criterion: Some("menor_preco".to_string()),
        },
    ]
}

fn demo_items() -> Vec<AdjudicatedItem> {
    vec![
        AdjudicatedItem::priced(
            "item-1",
            "lote-1",
            demo_supplier(0),
            "Notebook corporativo",
            Decimal::new(20, 0),
            Decimal::new(5_000, 0),
        ),
        AdjudicatedItem::priced(
            "item-2",
            "lote-1",
            demo_supplier(0),
            "Monitor 27 polegadas",
            Decimal::new(30, 0),
            Decimal::new(1_500, 0),
        ),
        AdjudicatedItem::priced(
            "item-3",
            "lote-2",
            demo_supplier(1),
            "Suporte técnico mensal",
            Decimal::new(12, 0),
            Decimal::new(11_500, 0),
        )
        .with_criterion("menor_preco"),
    ]
}
