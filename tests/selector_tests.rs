use heatseeker::{
    aggregate, binary_entropy, Agent, BoardState, Confidence, Layout, LookupAgent, Orientation,
    Placement, Policy, SamplerError, Scores, Shot, TargetSelector, Transition, UniformAgent,
};

/// 1x3 strip with one length-2 ship: weights 1, 2, 1.
fn strip() -> (BoardState, heatseeker::Heatmap) {
    let state = BoardState::new(3, 1, &[2]).unwrap();
    let layouts = [0, 1].map(|col| {
        Layout::from_placements(
            vec![Placement::new(0, 2, 0, col, Orientation::Horizontal)],
            3,
            1,
        )
        .unwrap()
    });
    let heatmap = aggregate(&state, layouts, true, 1);
    (state, heatmap)
}

#[test]
fn test_max_probability_picks_heaviest_cell() {
    let (state, heatmap) = strip();
    let selector = TargetSelector::new(false, Policy::MaxProbability, 0.0);
    let target = selector.select(&heatmap, &state, None).unwrap();
    assert_eq!((target.row, target.col), (0, 1));
    assert_eq!(target.score, 2.0);
    assert_eq!(target.confidence, Confidence::Full);
}

#[test]
fn test_max_information_prefers_uncertain_cells() {
    let (state, heatmap) = strip();
    assert_eq!(heatmap.probability(0, 1), 1.0);
    let selector = TargetSelector::new(false, Policy::MaxInformation, 0.0);
    let target = selector.select(&heatmap, &state, None).unwrap();
    // (0, 0) and (0, 2) tie on entropy and centre distance
    assert_eq!((target.row, target.col), (0, 0));
    assert_eq!(target.score, 1.0);
}

#[test]
fn test_parity_restricts_hunting() {
    let (state, heatmap) = strip();
    let selector = TargetSelector::new(true, Policy::MaxProbability, 0.0);
    let pool: Vec<_> = selector.candidates(&heatmap, &state).iter_set_bits().collect();
    assert_eq!(pool, vec![(0, 0), (0, 2)]);
    let target = selector.select(&heatmap, &state, None).unwrap();
    assert_eq!((target.row, target.col), (0, 0));
}

#[test]
fn test_parity_lifted_while_chasing_hits() {
    let mut state = BoardState::new(5, 5, &[2]).unwrap();
    state.record_shot(2, 2, Shot::Hit).unwrap();
    let layouts = [(2, 1, Orientation::Horizontal), (1, 2, Orientation::Vertical)].map(
        |(r, c, o)| Layout::from_placements(vec![Placement::new(0, 2, r, c, o)], 5, 5).unwrap(),
    );
    let heatmap = aggregate(&state, layouts, true, 1);
    let selector = TargetSelector::new(true, Policy::MaxProbability, 0.0);
    let pool = selector.candidates(&heatmap, &state);
    assert_eq!(pool, state.grid().unknown());
    let target = selector.select(&heatmap, &state, None).unwrap();
    // (1, 2) and (2, 1) are equally far from the centre
    assert_eq!((target.row, target.col), (1, 2));
}

#[test]
fn test_parity_falls_back_when_its_cells_are_empty() {
    let state = BoardState::new(4, 1, &[2]).unwrap();
    // weight lands only on (0, 1), which is off parity
    let layout =
        Layout::from_placements(vec![Placement::new(0, 1, 0, 1, Orientation::Horizontal)], 4, 1)
            .unwrap();
    let heatmap = aggregate(&state, [layout], true, 1);
    let selector = TargetSelector::new(true, Policy::MaxProbability, 0.0);
    assert_eq!(selector.candidates(&heatmap, &state), state.grid().unknown());
    let target = selector.select(&heatmap, &state, None).unwrap();
    assert_eq!((target.row, target.col), (0, 1));
}

#[test]
fn test_parity_step_follows_smallest_afloat_ship() {
    let state = BoardState::new(3, 1, &[3]).unwrap();
    let layout =
        Layout::from_placements(vec![Placement::new(0, 3, 0, 0, Orientation::Horizontal)], 3, 1)
            .unwrap();
    let heatmap = aggregate(&state, [layout], true, 1);
    let selector = TargetSelector::new(true, Policy::MaxProbability, 0.0);
    let pool: Vec<_> = selector.candidates(&heatmap, &state).iter_set_bits().collect();
    assert_eq!(pool, vec![(0, 0)]);
}

#[test]
fn test_selector_only_returns_unknown_cells() {
    let mut state = BoardState::new(3, 1, &[2]).unwrap();
    state.record_shot(0, 1, Shot::Miss).unwrap();
    state.record_shot(0, 0, Shot::Miss).unwrap();
    let heatmap = aggregate(&state, Vec::<Layout>::new(), false, 1);
    let selector = TargetSelector::default();
    let target = selector.select(&heatmap, &state, None).unwrap();
    assert_eq!((target.row, target.col), (0, 2));
    assert_eq!(target.confidence, Confidence::Degraded);

    state.record_shot(0, 2, Shot::Miss).unwrap();
    assert_eq!(
        selector.select(&heatmap, &state, None),
        Err(SamplerError::NoUnknownCells)
    );
}

#[test]
fn test_agent_blend_overrides_flat_heatmap() {
    let state = BoardState::new(10, 10, &[5, 4, 3, 3, 2]).unwrap();
    let heatmap = aggregate(&state, Vec::<Layout>::new(), false, 50);
    let mut scores = Scores::uniform(10, 10, 0.0);
    scores.set(9, 9, 5.0);

    let heat_only = TargetSelector::new(true, Policy::MaxProbability, 0.0);
    let target = heat_only.select(&heatmap, &state, Some(&scores)).unwrap();
    assert_eq!((target.row, target.col), (4, 4));

    let agent_only = TargetSelector::new(true, Policy::MaxProbability, 1.0);
    let target = agent_only.select(&heatmap, &state, Some(&scores)).unwrap();
    assert_eq!((target.row, target.col), (9, 9));
    assert_eq!(target.score, 1.0);
}

#[test]
fn test_agent_blend_mixes_rescaled_scores() {
    let (state, heatmap) = strip();
    // agent strongly prefers (0, 2); heatmap prefers (0, 1)
    let scores = Scores::from_vec(3, 1, vec![0.0, 0.0, 10.0]).unwrap();
    let selector = TargetSelector::new(false, Policy::MaxProbability, 0.3);
    let target = selector.select(&heatmap, &state, Some(&scores)).unwrap();
    assert_eq!((target.row, target.col), (0, 1));
    assert!((target.score - 0.7).abs() < 1e-12);

    let selector = TargetSelector::new(false, Policy::MaxProbability, 0.6);
    let target = selector.select(&heatmap, &state, Some(&scores)).unwrap();
    assert_eq!((target.row, target.col), (0, 2));
}

#[test]
fn test_binary_entropy() {
    assert_eq!(binary_entropy(0.0), 0.0);
    assert_eq!(binary_entropy(1.0), 0.0);
    assert!((binary_entropy(0.5) - 1.0).abs() < 1e-12);
    assert!((binary_entropy(0.2) - binary_entropy(0.8)).abs() < 1e-12);
    assert!(binary_entropy(0.3) < binary_entropy(0.4));
}

#[test]
fn test_scores_shape() {
    assert!(Scores::from_vec(2, 2, vec![0.0; 3]).is_none());
    let scores = UniformAgent.predict(&BoardState::new(4, 3, &[2]).unwrap());
    assert_eq!((scores.width(), scores.height()), (4, 3));
    assert_eq!(scores.get(2, 3), 1.0);
    assert_eq!(scores.get(3, 0), 0.0);
}

#[test]
fn test_lookup_agent_learns_mean_reward() {
    let state = BoardState::new(3, 3, &[2]).unwrap();
    let mut agent = LookupAgent::new(3, 3, 0.25);
    assert_eq!(agent.value(1, 1), 0.25);

    agent.observe(&Transition::new(1, 1, Shot::Hit));
    agent.observe(&Transition::new(1, 1, Shot::Miss));
    agent.observe(&Transition::new(0, 0, Shot::Sunk(0)));
    assert_eq!(agent.visits(1, 1), 2);
    assert_eq!(agent.value(1, 1), 0.5);
    assert_eq!(agent.value(0, 0), 1.0);

    let scores = agent.predict(&state);
    assert_eq!(scores.get(1, 1), 0.5);
    assert_eq!(scores.get(2, 2), 0.25);

    let bytes = agent.to_bincode().unwrap();
    let restored = LookupAgent::from_bincode(&bytes).unwrap();
    assert_eq!(restored, agent);
}

#[test]
fn test_transition_reward() {
    assert_eq!(Transition::new(0, 0, Shot::Miss).reward, 0.0);
    assert_eq!(Transition::new(0, 0, Shot::Hit).reward, 1.0);
    assert_eq!(Transition::new(0, 0, Shot::Sunk(3)).reward, 1.0);
}

#[test]
fn test_lookup_agent_rejects_mismatched_tables() {
    let mut bytes = LookupAgent::new(0, 0, 0.0).to_bincode().unwrap();
    // claim a 10x10 table while both value vectors stay empty
    bytes[0..8].copy_from_slice(&10u64.to_le_bytes());
    bytes[8..16].copy_from_slice(&10u64.to_le_bytes());
    assert!(LookupAgent::from_bincode(&bytes).is_err());

    let mut bytes = LookupAgent::new(2, 2, 0.0).to_bincode().unwrap();
    bytes[0..8].copy_from_slice(&3u64.to_le_bytes());
    assert!(LookupAgent::from_bincode(&bytes).is_err());

    assert!(LookupAgent::from_bincode(&bytes[..5]).is_err());
}
