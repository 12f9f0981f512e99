//! Tournament bracket generator.
//!
//! Reads a roster, builds the bracket for the chosen format and either prints
//! the plan as JSON or writes it to PostgreSQL in one transaction.

mod config;
mod logging;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Error};
use bracket_engine::db::{BracketRepository, Database, MemoryBracketRepository};
use bracket_engine::TournamentAssembler;
use bracket_engine::tournament::{StrategyRegistry, SystemClock};
use config::CliConfig;
use pico_args::Arguments;

const HELP: &str = "\
Generate a tournament bracket

USAGE:
  bracket_cli --teams FILE [OPTIONS]

OPTIONS:
  --teams      FILE        JSON roster: [{\"id\": 1, \"rating\": 1850.0}, ...]
  --format     NAME        single_elimination | double_elimination | swiss |
                           round_robin | group_stage_playoffs | gsl
                           [default: env BRACKET_FORMAT or single_elimination]
  --name       NAME        Tournament name  [default: Tournament]
  --group-size N           Teams per group  [default: env BRACKET_DEFAULT_GROUP_SIZE or 4]
  --advance    N           Teams leaving each group  [default: env BRACKET_ADVANCEMENT_PER_GROUP or 2]
  --max-teams  N           Registration cap  [default: roster size]
  --start      RFC3339     First match time  [default: now + BRACKET_START_DELAY_HOURS]
  --seed       N           RNG seed for reproducible shuffles
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --persist                Write the bracket to the database
  -h, --help               Print help information

ENVIRONMENT:
  DATABASE_URL             PostgreSQL connection string
  RUST_LOG                 Log filter  [default: info,sqlx=warn]
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    logging::init();

    let config = CliConfig::from_args(&mut pargs)?;
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        log::warn!("Ignoring unknown arguments: {remaining:?}");
    }

    let body = std::fs::read_to_string(&config.teams_path)
        .with_context(|| format!("Failed to read roster {}", config.teams_path.display()))?;
    let teams = config::parse_roster(&body)?;
    let request = config.request(teams);

    if !config.persist {
        let assembler = build_assembler(&config, Arc::new(MemoryBracketRepository::new()));
        let started = Instant::now();
        let plan = assembler.plan(&request)?;
        logging::log_performance(
            "plan",
            started.elapsed().as_millis() as u64,
            plan.row_count(),
        );
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    log::info!("Connecting to database");
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    db.run_migrations().await?;

    let assembler = build_assembler(&config, Arc::new(db.bracket_repository()));
    let started = Instant::now();
    let persisted = assembler.create_tournament(&request).await?;
    let rows = assembler.row_counts(persisted.tournament.id).await?;
    logging::log_performance(
        "create_tournament",
        started.elapsed().as_millis() as u64,
        rows.total(),
    );

    println!(
        "{}",
        serde_json::json!({
            "tournament_id": persisted.tournament.id,
            "slug": persisted.tournament.slug,
            "rows": rows,
        })
    );

    db.close().await;
    Ok(())
}

fn build_assembler(
    config: &CliConfig,
    repository: Arc<dyn BracketRepository>,
) -> TournamentAssembler {
    let assembler = TournamentAssembler::with_parts(
        repository,
        StrategyRegistry::standard(),
        config.engine.clone(),
        Arc::new(SystemClock),
    );
    match config.seed {
        Some(seed) => assembler.with_rng_seed(seed),
        None => assembler,
    }
}
