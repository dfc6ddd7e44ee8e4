use persona::engine::{apply_uci_move, Engine};
use persona::movegen::MoveGenerator;
use persona::position::{move_to_uci, Position, START_FEN};
use persona::search::MATE_BOUND;

#[test]
fn opening_search_returns_a_developing_move() {
    let mut engine = Engine::new(16);
    engine.personality.human_select = false;

    let result = engine.search(START_FEN, 10_000, 6);
    let position = Position::parse_fen(START_FEN).unwrap();

    assert!(result.nodes > 0);
    assert!(result.depth >= 4, "only reached depth {}", result.depth);
    assert!(MoveGenerator::legal(&position).contains(result.best_move));
    assert!(!position.is_capture(result.best_move));
}

#[test]
fn quiet_endgame_search_is_stable() {
    let mut engine = Engine::new(16);
    engine.personality.human_select = false;

    let fen = "6k1/5ppp/8/8/8/8/6PP/5RK1 w - - 0 1";
    let result = engine.search(fen, 0, 6);
    let position = Position::parse_fen(fen).unwrap();

    assert!(MoveGenerator::legal(&position).contains(result.best_move));
    assert!(result.depth >= 6, "only reached depth {}", result.depth);
    assert!(!result.pv.is_empty());
    assert_eq!(result.pv[0], result.best_move);
}

#[test]
fn mate_in_one_is_found_and_reported() {
    let mut engine = Engine::new(16);
    engine.personality.human_select = false;

    // Back-rank mate: the rook lands on a8 behind the untouched pawn cover.
    let fen = "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1";
    let result = engine.search(fen, 1000, 3);
    assert!(result.score > MATE_BOUND);
    assert_eq!(move_to_uci(result.best_move), "a1a8");
}

#[test]
fn position_command_round_trips_through_fen() {
    // Scenario: a double push shows up in the returned FEN with its
    // en-passant square, and the reply clears it.
    let after = apply_uci_move(START_FEN, "e2e4");
    assert!(after.contains(" b "));
    assert!(after.contains(" e3 "));

    let after = apply_uci_move(&after, "a7a6");
    assert!(after.contains(" w "));
    assert!(after.contains(" - "));
}

#[test]
fn human_selection_with_seed_is_reproducible_across_searches() {
    let mut first = Engine::new(16);
    first.personality.human_select = true;
    first.personality.human_temperature = 150;
    first.personality.human_noise_cp = 20;
    first.personality.random_seed = 4242;

    let mut second = Engine::new(16);
    second.personality = first.personality;

    let a = first.search(START_FEN, 500, 4);
    let b = second.search(START_FEN, 500, 4);
    assert_eq!(a.best_move, b.best_move);

    let position = Position::parse_fen(START_FEN).unwrap();
    assert!(MoveGenerator::legal(&position).contains(a.best_move));
}

#[test]
fn threefold_repetition_on_the_game_line_scores_zero() {
    let mut engine = Engine::new(16);
    engine.personality.human_select = false;

    // Both sides shuffle knights; the third visit of the start shape is a
    // draw, and the search must see the stack of prior hashes.
    let moves = [
        "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1",
    ];
    assert!(engine.set_position(START_FEN, &moves));

    // Black to move; ...Ng8 repeats the start shape for the third time, so a
    // draw is always in hand and the root score cannot be negative.
    let result = engine.go(persona::time::TimeControl::MoveTime(2000), Some(4), false);
    assert!(result.score >= 0, "score {}", result.score);
    assert!(result.score <= 300, "score {}", result.score);
}
