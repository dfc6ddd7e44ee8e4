use crate::movegen::MoveGenerator;
use crate::position::{move_to_uci, Position, START_FEN};
use std::time::Instant;

/// Leaf-node count at `depth`; the canonical correctness probe for move
/// generation plus make-move.
pub fn perft(position: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let legal = MoveGenerator::legal(position);
    if depth == 1 {
        return legal.count as u64;
    }

    let mut nodes = 0;
    for &mv in legal.as_slice() {
        let next = position.apply_move(mv);
        nodes += perft(&next, depth - 1);
    }
    nodes
}

/// Per-root-move breakdown, the first tool to reach for when a suite value
/// does not match.
pub fn perft_divide(position: &Position, depth: u8) -> u64 {
    println!("--- Perft Divide Depth {} ---", depth);
    let legal = MoveGenerator::legal(position);
    let mut total = 0;

    for &mv in legal.as_slice() {
        let next = position.apply_move(mv);
        let count = perft(&next, depth - 1);
        println!("{}: {}", move_to_uci(mv), count);
        total += count;
    }
    println!("Total: {}", total);
    total
}

pub fn run_perft_suite() {
    println!("--- Persona Perft Suite ---");

    let positions: [(&str, &str, [u64; 6]); 5] = [
        (
            "Start Position",
            START_FEN,
            [1, 20, 400, 8902, 197281, 4865609],
        ),
        (
            "Position 2 (Kiwipete)",
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            [1, 48, 2039, 97862, 4085603, 193690690],
        ),
        (
            "Position 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            [1, 14, 191, 2812, 43238, 674624],
        ),
        (
            "Position 4 (Promotions)",
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            [1, 6, 264, 9467, 422333, 15833292],
        ),
        (
            "Position 5",
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            [1, 44, 1486, 62379, 2103487, 89941194],
        ),
    ];

    let mut total_nodes = 0;
    let mut total_time = 0;

    for (name, fen, expected) in positions.iter() {
        println!("\nTesting: {}", name);
        let position = Position::parse_fen(fen).expect("suite FEN parses");

        let depth = 4;
        let start = Instant::now();
        let nodes = perft(&position, depth as u8);
        let elapsed = start.elapsed().as_millis();

        total_nodes += nodes;
        total_time += elapsed;

        println!("Depth {}: Nodes: {} Time: {}ms", depth, nodes, elapsed);
        if nodes == expected[depth] {
            println!("RESULT: PASS");
        } else {
            println!("RESULT: FAIL (Expected {})", expected[depth]);
            perft_divide(&position, depth as u8);
        }
    }

    println!("\n--- SUITE COMPLETE ---");
    println!("Total Nodes: {}", total_nodes);
    println!("Total Time:  {}ms", total_time);
    if total_time > 0 {
        println!("NPS:         {}", (total_nodes as u128 * 1000) / total_time);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    #[test]
    fn perft_start_position() {
        crate::init();
        let position = Position::parse_fen(START_FEN).unwrap();
        assert_eq!(perft(&position, 1), 20);
        assert_eq!(perft(&position, 2), 400);
        assert_eq!(perft(&position, 3), 8902);
        assert_eq!(perft(&position, 4), 197281);
    }

    #[test]
    #[ignore] // ~seconds in debug builds; run with --ignored
    fn perft_start_position_depth_5() {
        crate::init();
        let position = Position::parse_fen(START_FEN).unwrap();
        assert_eq!(perft(&position, 5), 4865609);
    }

    #[test]
    fn perft_kiwipete() {
        crate::init();
        let position = Position::parse_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        )
        .unwrap();
        assert_eq!(perft(&position, 1), 48);
        assert_eq!(perft(&position, 2), 2039);
        assert_eq!(perft(&position, 3), 97862);
    }

    #[test]
    fn perft_castling_rights() {
        crate::init();
        let position = Position::parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert_eq!(perft(&position, 1), 26);
    }

    #[test]
    fn perft_en_passant_pins() {
        crate::init();
        let position =
            Position::parse_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap();
        assert_eq!(perft(&position, 1), 14);
        assert_eq!(perft(&position, 2), 191);
        assert_eq!(perft(&position, 3), 2812);
        assert_eq!(perft(&position, 4), 43238);
    }

    #[test]
    fn perft_divide_depth_3_matches_reference() {
        crate::init();
        let position = Position::parse_fen(START_FEN).unwrap();
        let reference = [
            ("a2a3", 380u64),
            ("a2a4", 420),
            ("b2b3", 420),
            ("b2b4", 421),
            ("c2c3", 420),
            ("c2c4", 441),
            ("d2d3", 539),
            ("d2d4", 560),
            ("e2e3", 599),
            ("e2e4", 600),
            ("f2f3", 380),
            ("f2f4", 401),
            ("g2g3", 420),
            ("g2g4", 421),
            ("h2h3", 380),
            ("h2h4", 420),
            ("b1a3", 400),
            ("b1c3", 440),
            ("g1f3", 440),
            ("g1h3", 400),
        ];

        let legal = MoveGenerator::legal(&position);
        assert_eq!(legal.count, reference.len());

        for &mv in legal.as_slice() {
            let next = position.apply_move(mv);
            let count = perft(&next, 2);
            let uci = move_to_uci(mv);
            let expected = reference
                .iter()
                .find(|(name, _)| *name == uci)
                .map(|(_, c)| *c)
                .unwrap_or_else(|| panic!("unexpected root move {}", uci));
            assert_eq!(count, expected, "mismatch for {}", uci);
        }
    }
}
