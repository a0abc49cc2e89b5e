use heatseeker::{BoardError, BoardState, Cell, Grid, Orientation, Placement, Shot};

fn board(text: &str, ships: &[usize]) -> BoardState {
    let grid: Grid = text.parse().unwrap();
    BoardState::with_grid(grid, ships).unwrap()
}

#[test]
fn test_parse_and_display_roundtrip() {
    let text = "..o.\nx..A\n....";
    let grid: Grid = text.parse().unwrap();
    assert_eq!((grid.width(), grid.height()), (4, 3));
    assert_eq!(grid.get(0, 2).unwrap(), Cell::Miss);
    assert_eq!(grid.get(1, 0).unwrap(), Cell::Hit);
    assert_eq!(grid.get(1, 3).unwrap(), Cell::Sunk(0));
    assert_eq!(grid.to_string(), text);
}

#[test]
fn test_parse_ignores_blank_lines_and_spaces() {
    let grid: Grid = "\n  . . o \n\n x . . \n".parse().unwrap();
    assert_eq!((grid.width(), grid.height()), (3, 2));
    assert_eq!(grid.hits().count_ones(), 1);
}

#[test]
fn test_parse_errors() {
    assert!(matches!(
        "..\n...".parse::<Grid>(),
        Err(BoardError::Parse { line: 2, .. })
    ));
    assert!(matches!(
        "..X\n.#.".parse::<Grid>(),
        Err(BoardError::Parse { line: 2, .. })
    ));
    assert!(matches!("\n\n".parse::<Grid>(), Err(BoardError::Parse { .. })));
    // uppercase letters are ship ids, not shot marks
    let grid: Grid = "O.X".parse().unwrap();
    assert_eq!(grid.get(0, 0).unwrap(), Cell::Sunk(14));
    assert_eq!(grid.get(0, 2).unwrap(), Cell::Sunk(23));
}

#[test]
fn test_oversized_grid_rejected() {
    let row = ".".repeat(13);
    let text = vec![row; 10].join("\n");
    assert!(matches!(
        text.parse::<Grid>(),
        Err(BoardError::BitBoardError(_))
    ));
}

#[test]
fn test_record_shot_updates_cells() {
    let mut state = BoardState::new(5, 5, &[3, 2]).unwrap();
    state.record_shot(0, 0, Shot::Miss).unwrap();
    state.record_shot(2, 2, Shot::Hit).unwrap();
    state.record_shot(2, 3, Shot::Sunk(1)).unwrap();

    assert_eq!(state.grid().get(0, 0).unwrap(), Cell::Miss);
    assert_eq!(state.grid().get(2, 2).unwrap(), Cell::Hit);
    assert_eq!(state.grid().get(2, 3).unwrap(), Cell::Sunk(1));
    assert!(state.ship(1).unwrap().sunk);
    assert!(!state.all_sunk());

    assert_eq!(
        state.record_shot(2, 2, Shot::Miss),
        Err(BoardError::AlreadyShot { row: 2, col: 2 })
    );
    assert_eq!(
        state.record_shot(5, 0, Shot::Miss),
        Err(BoardError::OutOfBounds { row: 5, col: 0 })
    );
    assert_eq!(
        state.record_shot(4, 4, Shot::Sunk(1)),
        Err(BoardError::ShipAlreadySunk(1))
    );
    assert_eq!(
        state.record_shot(4, 4, Shot::Sunk(7)),
        Err(BoardError::UnknownShip(7))
    );
}

#[test]
fn test_sunk_without_footprint_stays_unresolved() {
    let mut state = BoardState::new(5, 5, &[3, 2]).unwrap();
    state.record_shot(2, 2, Shot::Hit).unwrap();
    state.record_shot(2, 3, Shot::Sunk(1)).unwrap();

    assert!(!state.is_resolved(1));
    assert_eq!(state.unresolved().count(), 2);
    assert_eq!(state.remaining_cells(), 5);
    let pinned: Vec<_> = state.pinned().iter_set_bits().collect();
    assert_eq!(pinned, vec![(2, 2), (2, 3)]);
    assert_eq!(state.smallest_afloat(), Some(3));
}

#[test]
fn test_reveal_sunk_resolves_ship() {
    let mut state = BoardState::new(5, 5, &[3, 2]).unwrap();
    state.record_shot(2, 2, Shot::Hit).unwrap();
    state.record_shot(2, 3, Shot::Sunk(1)).unwrap();
    state
        .reveal_sunk(&Placement::new(1, 2, 2, 2, Orientation::Horizontal))
        .unwrap();

    assert!(state.is_resolved(1));
    assert_eq!(state.grid().get(2, 2).unwrap(), Cell::Sunk(1));
    assert_eq!(state.remaining_cells(), 3);
    assert!(state.pinned().is_empty());
    assert_eq!(state.unresolved().map(|s| s.id).collect::<Vec<_>>(), vec![0]);
}

#[test]
fn test_reveal_sunk_rejects_mismatch() {
    let mut state = BoardState::new(5, 5, &[3, 2]).unwrap();
    state.record_shot(2, 3, Shot::Sunk(1)).unwrap();
    // (2, 4) was never hit
    assert_eq!(
        state.reveal_sunk(&Placement::new(1, 2, 2, 3, Orientation::Horizontal)),
        Err(BoardError::FootprintMismatch(1))
    );
    // wrong length
    assert_eq!(
        state.reveal_sunk(&Placement::new(1, 3, 2, 1, Orientation::Horizontal)),
        Err(BoardError::FootprintMismatch(1))
    );
}

#[test]
fn test_with_grid_marks_sunk_ships() {
    let state = board("EE........\n..........", &[5, 4, 3, 3, 2]);
    assert!(state.ship(4).unwrap().sunk);
    assert!(state.is_resolved(4));
    assert_eq!(state.remaining_cells(), 15);
    assert_eq!(state.smallest_afloat(), Some(3));

    let grid: Grid = "AAA".parse().unwrap();
    assert_eq!(
        BoardState::with_grid(grid, &[2]),
        Err(BoardError::FootprintMismatch(0))
    );
    let grid: Grid = "C..".parse().unwrap();
    assert_eq!(
        BoardState::with_grid(grid, &[2]),
        Err(BoardError::UnknownShip(2))
    );
}
