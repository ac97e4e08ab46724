use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use hexclaim::{
    scenario::ScenarioLoader,
    session::{Session, SessionSettings},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Headless hexclaim runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/river_valley.yaml")]
    scenario: PathBuf,

    /// Override round count (uses scenario default when omitted)
    #[arg(long)]
    rounds: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override snapshot interval in rounds
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Serve state and events over HTTP while the game plays
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&scenario.config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    let rounds = scenario.rounds(cli.rounds);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_rounds);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| PathBuf::from("snapshots"));

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(web::run(WebServerConfig {
            scenario,
            rounds,
            snapshot_interval,
            snapshot_dir,
            host: cli.host,
            port: cli.port,
        }));
    }

    let mut state = scenario.build_state()?;
    let mut session = Session::new(SessionSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_rounds: snapshot_interval,
        snapshot_dir,
    });
    session.run(&mut state, rounds)?;

    for faction in state.factions() {
        tracing::info!(
            faction = %faction.name,
            currency = faction.currency(),
            "final standing"
        );
    }
    tracing::info!(
        scenario = %scenario.name,
        rounds,
        cities = state.cities().len(),
        "scenario completed"
    );
    Ok(())
}
