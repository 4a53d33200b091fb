use crate::demo::{
    run_defaults, run_demo, run_ranking_report, run_scenarios, DefaultsArgs, DemoArgs,
    RankingReportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sourcing_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Sourcing Engine",
    about = "Score supplier proposals, build comparative maps and finalize awards",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank a bid spreadsheet and print the comparative map
    Ranking {
        #[command(subcommand)]
        command: RankingCommand,
    },
    /// List the preset weighting scenarios
    Scenarios,
    /// Suggest an event type and profile for a sector and category
    Defaults(DefaultsArgs),
    /// Run an end-to-end demo from ranking to a finalized award
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum RankingCommand {
    /// Build a comparative map from a proposals CSV export
    Report(RankingReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ranking {
            command: RankingCommand::Report(args),
        } => run_ranking_report(args),
        Command::Scenarios => run_scenarios(),
        Command::Defaults(args) => run_defaults(args),
        Command::Demo(args) => run_demo(args),
    }
}
