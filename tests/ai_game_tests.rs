use heatseeker::{autoplay, Fleet, LookupAgent, Sampler, SamplerConfig, Shot};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::HashSet;

fn quick_config() -> SamplerConfig {
    SamplerConfig {
        sample_budget: 200,
        ..SamplerConfig::default()
    }
}

#[test]
fn test_seeded_game_sinks_every_ship() {
    let config = quick_config();
    let mut rng = SmallRng::seed_from_u64(123);
    let mut fleet = Fleet::random(&config, &mut rng).unwrap();
    let mut sampler = Sampler::new(config.clone()).unwrap();

    let report = autoplay(&mut sampler, &mut fleet, &mut rng, None, false).unwrap();
    assert!(fleet.all_sunk());
    assert!(report.shots <= 100);
    assert_eq!(report.hits, config.total_ship_cells());
    assert_eq!(report.history.len(), report.shots);

    let unique: HashSet<_> = report.history.iter().map(|&(r, c, _)| (r, c)).collect();
    assert_eq!(unique.len(), report.shots);
    let sinks = report
        .history
        .iter()
        .filter(|(_, _, s)| matches!(s, Shot::Sunk(_)))
        .count();
    assert_eq!(sinks, config.ships.len());
}

#[test]
fn test_games_are_reproducible() {
    let config = quick_config();
    let play = || {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut fleet = Fleet::random(&config, &mut rng).unwrap();
        let mut sampler = Sampler::new(config.clone()).unwrap();
        autoplay(&mut sampler, &mut fleet, &mut rng, None, false).unwrap()
    };
    assert_eq!(play(), play());
}

#[test]
fn test_revealed_sinks_and_no_touch_rules() {
    let config = SamplerConfig {
        ships_may_touch: false,
        ..quick_config()
    };
    for seed in 0..3 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut fleet = Fleet::random(&config, &mut rng).unwrap();
        let mut sampler = Sampler::new(config.clone()).unwrap();
        let report = autoplay(&mut sampler, &mut fleet, &mut rng, None, true).unwrap();
        assert!(report.shots <= 100);
        assert_eq!(report.hits, config.total_ship_cells());
    }
}

#[test]
fn test_small_board_game_is_exhaustive_and_fast() {
    let config = SamplerConfig {
        width: 5,
        height: 5,
        ships: vec![3, 2],
        ..SamplerConfig::default()
    };
    let mut rng = SmallRng::seed_from_u64(11);
    let mut fleet = Fleet::random(&config, &mut rng).unwrap();
    let mut sampler = Sampler::new(config).unwrap();
    let report = autoplay(&mut sampler, &mut fleet, &mut rng, None, false).unwrap();
    assert!(report.shots <= 25);
    assert_eq!(report.degraded_turns, 0);
}

#[test]
fn test_agent_observes_every_shot() {
    let config = SamplerConfig {
        agent_blend: 0.2,
        ..quick_config()
    };
    let mut rng = SmallRng::seed_from_u64(42);
    let mut fleet = Fleet::random(&config, &mut rng).unwrap();
    let mut sampler = Sampler::new(config.clone()).unwrap();
    let mut agent = LookupAgent::new(10, 10, 0.5);

    let report = autoplay(&mut sampler, &mut fleet, &mut rng, Some(&mut agent), false).unwrap();
    let visits: u64 = (0..10)
        .flat_map(|r| (0..10).map(move |c| (r, c)))
        .map(|(r, c)| agent.visits(r, c))
        .sum();
    assert_eq!(visits as usize, report.shots);
    for &(r, c, shot) in &report.history {
        assert_eq!(agent.value(r, c), shot.reward());
    }
}
