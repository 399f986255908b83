//! Integration tests for the settlers engine.
//!
//! These tests exercise the public API end to end: board generation,
//! seating players, placing pieces and reading snapshots.

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use settlers_core::snapshot::player_snapshot;
use settlers_core::*;
use std::collections::{HashMap, HashSet};

fn seeded_board(seed: u64) -> Board {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_standard_board(&mut rng)
}

fn alice_and_bob(board: Board) -> GameState {
    GameState::new(
        board,
        vec![Player::new(1, "Alice", "red"), Player::new(2, "Bob", "blue")],
    )
    .expect("two players is a valid game")
}

/// Check every structural invariant of a generated board
fn assert_standard_board(board: &Board) {
    let tiles = board.tiles();
    assert_eq!(tiles.len(), 19);

    let ids: HashSet<usize> = tiles.iter().map(|t| t.id).collect();
    assert_eq!(ids, (0..19).collect::<HashSet<_>>());

    let mut terrain: HashMap<&str, usize> = HashMap::new();
    for tile in tiles {
        *terrain.entry(tile.terrain.name()).or_default() += 1;
        assert_eq!(tile.number.is_none(), tile.terrain.is_desert());
        assert!(tile.coord.is_on_standard_board());
    }
    assert_eq!(
        terrain,
        HashMap::from([
            ("wood", 4),
            ("sheep", 4),
            ("wheat", 4),
            ("brick", 3),
            ("ore", 3),
            ("desert", 1),
        ])
    );

    let mut numbers: Vec<u8> = tiles.iter().filter_map(|t| t.number).collect();
    numbers.sort_unstable();
    assert_eq!(
        numbers,
        vec![2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12]
    );

    let ports = board.ports();
    assert_eq!(ports.len(), 9);
    assert_eq!(
        ports
            .iter()
            .filter(|p| p.kind.ratio() == 3 && p.kind.resource().is_none())
            .count(),
        4
    );
    let specific: HashSet<Resource> = ports
        .iter()
        .filter(|p| p.kind.ratio() == 2)
        .filter_map(|p| p.kind.resource())
        .collect();
    assert_eq!(specific.len(), 5);
    assert_eq!(ports.iter().filter(|p| p.kind.ratio() == 2).count(), 5);
    for port in ports {
        assert!(is_coastal(port.anchor.q, port.anchor.r));
    }

    let robber = board.robber().expect("robber on the desert");
    assert!(robber.terrain.is_desert());
}

#[test]
fn test_generated_boards_satisfy_invariants() {
    for seed in 0..200 {
        assert_standard_board(&seeded_board(seed));
    }
}

#[test]
fn test_generation_varies_across_trials() {
    let boards: Vec<Board> = (0..50).map(seeded_board).collect();

    let desert_positions: HashSet<usize> = boards
        .iter()
        .filter_map(|b| b.desert().map(|t| t.id))
        .collect();
    assert!(desert_positions.len() > 1, "desert never moved");

    let first_ports: HashSet<PortKind> = boards.iter().map(|b| b.ports()[0].kind).collect();
    assert!(first_ports.len() > 1, "port kinds never shuffled");

    let centre_numbers: HashSet<Option<u8>> =
        boards.iter().map(|b| b.tiles()[9].number).collect();
    assert!(centre_numbers.len() > 1, "numbers never shuffled");
}

#[test]
fn test_new_game_state() {
    let state = alice_and_bob(seeded_board(1));
    assert_eq!(state.current_player_index(), 0);
    assert_eq!(state.turn_phase(), TurnPhase::Setup);
    assert_eq!(state.current_player().name, "Alice");

    let snapshot = game_snapshot(&state);
    assert_eq!(serde_json::to_value(&snapshot).unwrap()["turn_phase"], "setup");
}

#[test]
fn test_end_to_end_settlement_placement() {
    let board = seeded_board(2024);
    assert_eq!(board.tiles().len(), 19);
    assert_eq!(board.ports().len(), 9);

    let mut state = alice_and_bob(board);
    let bob_before = player_snapshot(state.player(2).unwrap());

    let origin = HexPosition::new(0, 0);
    state
        .apply_action(&Permissive, 1, GameAction::PlaceSettlement(origin))
        .expect("permissive rules accept any placement");

    let alice = player_snapshot(state.player(1).unwrap());
    assert!(alice.settlements.iter().any(|p| p.q == 0 && p.r == 0));
    assert_eq!(alice.victory_points, 1);
    assert_eq!(player_snapshot(state.player(2).unwrap()), bob_before);
}

#[test]
fn test_standard_rules_turn_sequence() {
    let mut state = alice_and_bob(seeded_board(9));
    let rules = StandardRules;

    // Setup: Alice places a settlement and a road, then hands over to Bob
    state
        .place_settlement(&rules, 1, HexPosition::new(0, 0))
        .unwrap();
    state
        .place_road(
            &rules,
            1,
            Road::new(HexPosition::new(0, 0), HexPosition::new(1, -1)),
        )
        .unwrap();
    state.apply_action(&rules, 1, GameAction::EndTurn).unwrap();

    // Bob cannot crowd Alice
    let err = state
        .place_settlement(&rules, 2, HexPosition::new(1, 0))
        .unwrap_err();
    assert!(matches!(
        err,
        GameError::Rejected(MoveRejection::IllegalPosition(_))
    ));

    state
        .place_settlement(&rules, 2, HexPosition::new(-2, 2))
        .unwrap();
    state.apply_action(&rules, 2, GameAction::EndTurn).unwrap();
    assert_eq!(state.current_player_index(), 0);

    // Main phase: building costs resources
    state.set_phase(TurnPhase::Main);
    let err = state
        .place_settlement(&rules, 1, HexPosition::new(2, -2))
        .unwrap_err();
    assert_eq!(
        err,
        GameError::Rejected(MoveRejection::IllegalPosition(
            "(2, -2) is not connected to your roads".to_string()
        ))
    );

    let snapshot = game_snapshot(&state);
    assert_eq!(snapshot.players[0].victory_points, 1);
    assert_eq!(snapshot.players[1].victory_points, 1);
    assert_eq!(snapshot.players[0].roads.len(), 1);
}
