#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use heatseeker::{
    autoplay, init_logging, BoardState, Fleet, Grid, LookupAgent, Policy, Sampler,
    SamplerConfig,
};

#[cfg(feature = "std")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags layered over the JSON configuration file.
#[derive(Args, Debug, Clone)]
#[cfg(feature = "std")]
struct Tuning {
    #[arg(long, help = "JSON file with sampler settings; missing keys take defaults")]
    config: Option<PathBuf>,
    #[arg(long, help = "Fix RNG seed for reproducible runs (e.g., --seed 12345)")]
    seed: Option<u64>,
    #[arg(long, help = "Maximum layouts generated per turn")]
    budget: Option<usize>,
    #[arg(long, help = "Worker threads for sampling")]
    workers: Option<usize>,
    #[arg(long, value_enum)]
    policy: Option<Policy>,
    #[arg(long, help = "Ship lengths, comma separated (e.g., --ships 5,4,3,3,2)", value_delimiter = ',')]
    ships: Option<Vec<usize>>,
    #[arg(long, help = "Forbid ships from touching, diagonals included")]
    no_touch: bool,
    #[arg(long, help = "Disable parity pruning while hunting")]
    no_parity: bool,
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Suggest the next shot for a board read from a text file.
    Suggest {
        /// Board file: `.` unknown, `o` miss, `x` hit, `A`-`Z` sunk ship.
        board: PathBuf,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Play the engine against random hidden fleets.
    Autoplay {
        #[arg(long, default_value_t = 1)]
        games: usize,
        #[arg(long, help = "Reveal a ship's full footprint when it sinks")]
        reveal_sunk: bool,
        #[arg(long, help = "Blend a lookup agent, saved to and loaded from this file")]
        agent: Option<PathBuf>,
        #[arg(long, default_value_t = 0.0)]
        blend: f64,
        #[command(flatten)]
        tuning: Tuning,
    },
}

#[cfg(feature = "std")]
fn load_config(tuning: &Tuning) -> anyhow::Result<SamplerConfig> {
    let mut config = match &tuning.config {
        Some(path) => SamplerConfig::from_json_file(path)?,
        None => SamplerConfig::default(),
    };
    if let Some(seed) = tuning.seed {
        config.seed = seed;
    }
    if let Some(budget) = tuning.budget {
        config.sample_budget = budget;
    }
    if let Some(workers) = tuning.workers {
        config.workers = workers;
    }
    if let Some(policy) = tuning.policy {
        config.policy = policy;
    }
    if let Some(ships) = &tuning.ships {
        config.ships = ships.clone();
    }
    if tuning.no_touch {
        config.ships_may_touch = false;
    }
    if tuning.no_parity {
        config.parity = false;
    }
    Ok(config)
}

#[cfg(feature = "std")]
fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Suggest { board, tuning } => {
            let mut config = load_config(&tuning)?;
            let text = std::fs::read_to_string(&board)?;
            let grid: Grid = text.parse().map_err(|e| anyhow::anyhow!("{}: {}", board.display(), e))?;
            config.width = grid.width();
            config.height = grid.height();
            let state = BoardState::with_grid(grid, &config.ships).map_err(|e| anyhow::anyhow!(e))?;

            let mut sampler = Sampler::new(config).map_err(|e| anyhow::anyhow!(e))?;
            let decision = if sampler.config().workers > 1 {
                sampler.decide_parallel(&state, None)
            } else {
                sampler.decide_seeded(&state, None)
            }
            .map_err(|e| anyhow::anyhow!(e))?;

            println!("{}", state.grid());
            println!("{}", decision.heatmap);
            println!(
                "Target: row {}, col {} (score {:.4}, {:?}, {} {:?} layouts)",
                decision.target.row,
                decision.target.col,
                decision.target.score,
                decision.target.confidence,
                decision.stats.layouts,
                decision.stats.mode
            );
        }
        Commands::Autoplay {
            games,
            reveal_sunk,
            agent,
            blend,
            tuning,
        } => {
            let mut config = load_config(&tuning)?;
            config.agent_blend = blend;
            let seed = config.seed;
            let mut lookup = match &agent {
                Some(path) if path.exists() => {
                    let bytes = std::fs::read(path)?;
                    Some(LookupAgent::from_bincode(&bytes)?)
                }
                Some(_) => Some(LookupAgent::new(config.width, config.height, 0.0)),
                None => None,
            };
            let mut sampler = Sampler::new(config.clone()).map_err(|e| anyhow::anyhow!(e))?;

            let mut total = 0;
            for game in 0..games {
                let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(game as u64));
                let mut fleet = Fleet::random(&config, &mut rng).map_err(|e| anyhow::anyhow!(e))?;
                let report = autoplay(
                    &mut sampler,
                    &mut fleet,
                    &mut rng,
                    lookup.as_mut().map(|a| a as &mut dyn heatseeker::Agent),
                    reveal_sunk,
                )
                .map_err(|e| anyhow::anyhow!(e))?;
                println!(
                    "Game {}: {} shots, {} hits, {} degraded turns",
                    game + 1,
                    report.shots,
                    report.hits,
                    report.degraded_turns
                );
                total += report.shots;
            }
            if games > 0 {
                println!("Mean shots: {:.2}", total as f64 / games as f64);
            }

            if let (Some(path), Some(lookup)) = (&agent, &lookup) {
                std::fs::write(path, lookup.to_bincode()?)?;
            }
        }
    }
    Ok(())
}
