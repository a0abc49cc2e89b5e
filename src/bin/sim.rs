use heatseeker::{autoplay, Fleet, Sampler, SamplerConfig};
use rand::{rngs::SmallRng, SeedableRng};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <seed> <games>", args[0]);
        std::process::exit(1);
    }
    let seed: u64 = args[1].parse()?;
    let games: usize = args[2].parse()?;

    let config = SamplerConfig {
        seed,
        sample_budget: 500,
        ..SamplerConfig::default()
    };
    let mut sampler = Sampler::new(config.clone()).map_err(|e| anyhow::anyhow!(e))?;

    let mut shots = Vec::with_capacity(games);
    for game in 0..games {
        let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(game as u64));
        let mut fleet = Fleet::random(&config, &mut rng).map_err(|e| anyhow::anyhow!(e))?;
        let report = autoplay(&mut sampler, &mut fleet, &mut rng, None, false)
            .map_err(|e| anyhow::anyhow!(e))?;
        shots.push(report.shots);
    }

    let mean = if shots.is_empty() {
        0.0
    } else {
        shots.iter().sum::<usize>() as f64 / shots.len() as f64
    };
    let result = json!({
        "seed": seed,
        "games": games,
        "shots": shots,
        "mean": mean,
    });

    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
