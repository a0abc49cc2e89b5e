use heatseeker::{
    aggregate, is_feasible_layout, BoardState, Cell, Fleet, Mode, PlacementGenerator, Sampler,
    SamplerConfig,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Board after `shots` random shots at a hidden fleet, so it is always
/// consistent with at least one layout.
fn partial_game(config: &SamplerConfig, seed: u64, shots: usize) -> BoardState {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut fleet = Fleet::random(config, &mut rng).unwrap();
    let mut state = config.new_board().unwrap();
    for _ in 0..shots {
        let unknown: Vec<_> = state.grid().unknown().iter_set_bits().collect();
        if unknown.is_empty() || fleet.all_sunk() {
            break;
        }
        let (r, c) = unknown[rng.random_range(0..unknown.len())];
        let shot = fleet.fire(r, c).unwrap();
        state.record_shot(r, c, shot).unwrap();
    }
    state
}

fn small_config(touch: bool, budget: usize) -> SamplerConfig {
    SamplerConfig {
        width: 6,
        height: 6,
        ships: vec![4, 3, 2],
        sample_budget: budget,
        ships_may_touch: touch,
        ..SamplerConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn layouts_are_feasible(seed in any::<u64>(), shots in 0usize..30, touch in any::<bool>()) {
        let config = small_config(touch, 200);
        let state = partial_game(&config, seed, shots);
        let gen = PlacementGenerator::new(&state, &config).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let unresolved = state.unresolved().count();
        for layout in gen.generate(&mut rng) {
            prop_assert!(layout.is_disjoint());
            prop_assert_eq!(layout.placements().len(), unresolved);
            for p in layout.placements() {
                prop_assert!(p.fits(config.width, config.height));
            }
            prop_assert!(is_feasible_layout(&state, &layout, touch));
        }
    }

    #[test]
    fn heatmap_sum_matches_layout_cells(seed in any::<u64>(), shots in 0usize..30) {
        let config = small_config(true, 300);
        let state = partial_game(&config, seed, shots);
        let gen = PlacementGenerator::new(&state, &config).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let heatmap = aggregate(&state, gen.generate(&mut rng), false, 1);
        let per_layout = state.remaining_cells() - state.pinned().count_ones();
        prop_assert_eq!(heatmap.sum(), (heatmap.layouts() * per_layout) as f64);

        let unknown = state.grid().unknown();
        for (r, c, w) in heatmap.iter() {
            prop_assert!(w >= 0.0);
            if !unknown.contains(r, c) {
                prop_assert_eq!(w, 0.0);
            }
        }
        let normalized = heatmap.normalized();
        for (_, _, p) in normalized.iter() {
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn generation_is_deterministic(seed in any::<u64>(), shots in 0usize..20) {
        let config = small_config(true, 100);
        let state = partial_game(&config, seed, shots);
        let gen = PlacementGenerator::new(&state, &config).unwrap();
        let a: Vec<_> = gen.generate(&mut SmallRng::seed_from_u64(7)).collect();
        let b: Vec<_> = gen.generate(&mut SmallRng::seed_from_u64(7)).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn seeded_turn_targets_the_same_unknown_cell(
        seed in any::<u64>(),
        shots in 0usize..20,
        touch in any::<bool>(),
    ) {
        let config = SamplerConfig { seed, ..small_config(touch, 150) };
        let state = partial_game(&config, seed, shots);
        prop_assume!(!state.all_sunk());
        let mut sampler = Sampler::new(config).unwrap();
        let a = sampler.decide_seeded(&state, None).unwrap();
        let b = sampler.decide_seeded(&state, None).unwrap();
        prop_assert_eq!((a.target.row, a.target.col), (b.target.row, b.target.col));
        prop_assert_eq!(a.heatmap, b.heatmap);
        prop_assert_eq!(state.grid().get(a.target.row, a.target.col).unwrap(), Cell::Unknown);
    }

    #[test]
    fn budget_caps_output(seed in any::<u64>(), budget in 0usize..50) {
        let config = small_config(true, budget);
        let state = partial_game(&config, seed, 5);
        let gen = PlacementGenerator::new(&state, &config).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut layouts = gen.generate(&mut rng);
        let count = layouts.by_ref().count();
        prop_assert!(count <= budget);
        prop_assert_eq!(layouts.stats().layouts, count);
    }
}

#[test]
fn exhaustive_and_sampling_agree_on_support() {
    let base = SamplerConfig {
        width: 4,
        height: 4,
        ships: vec![2, 2],
        ..SamplerConfig::default()
    };
    let mut state = base.new_board().unwrap();
    state.record_shot(1, 1, heatseeker::Shot::Miss).unwrap();

    let exhaustive_config = SamplerConfig {
        sample_budget: 100_000,
        ..base.clone()
    };
    let exact = PlacementGenerator::new(&state, &exhaustive_config).unwrap();
    assert_eq!(exact.mode(), Mode::Exhaustive);
    let mut rng = SmallRng::seed_from_u64(1);
    let exact_map = aggregate(&state, exact.generate(&mut rng), true, 1);

    let sampling_config = SamplerConfig {
        sample_budget: 20_000,
        exhaustive_limit: 0,
        ..base
    };
    let sampled = PlacementGenerator::new(&state, &sampling_config).unwrap();
    assert_eq!(sampled.mode(), Mode::Sampling);
    let mut rng = SmallRng::seed_from_u64(2);
    let sampled_map = aggregate(&state, sampled.generate(&mut rng), false, 1);

    for (r, c, w) in exact_map.iter() {
        assert_eq!(w > 0.0, sampled_map.get(r, c) > 0.0, "cell ({}, {})", r, c);
    }
}

#[test]
fn exhaustive_enumerates_every_layout_once() {
    // two ships of length 2 on a 1x5 strip: positions {0,2},{0,3},{1,3} in either order
    let config = SamplerConfig {
        width: 5,
        height: 1,
        ships: vec![2, 2],
        ..SamplerConfig::default()
    };
    let state = config.new_board().unwrap();
    let gen = PlacementGenerator::new(&state, &config).unwrap();
    assert_eq!(gen.mode(), Mode::Exhaustive);
    let mut rng = SmallRng::seed_from_u64(0);
    let layouts: Vec<_> = gen.generate(&mut rng).collect();
    assert_eq!(layouts.len(), 6);
    for (i, a) in layouts.iter().enumerate() {
        for b in &layouts[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn exhaustive_shards_partition_the_enumeration() {
    let config = SamplerConfig {
        width: 5,
        height: 4,
        ships: vec![3, 2],
        ..SamplerConfig::default()
    };
    let state = config.new_board().unwrap();
    let gen = PlacementGenerator::new(&state, &config).unwrap();
    assert_eq!(gen.mode(), Mode::Exhaustive);
    let mut rng = SmallRng::seed_from_u64(0);
    let mut full: Vec<_> = gen.generate(&mut rng).collect();

    let mut sharded = Vec::new();
    for shard in 0..3 {
        sharded.extend(gen.generate_shard(&mut rng, shard, 3));
    }
    let key = |l: &heatseeker::Layout| l.placements().to_vec();
    full.sort_by_key(key);
    sharded.sort_by_key(key);
    assert_eq!(full, sharded);
}
