use crate::engine::Engine;
use crate::position::START_FEN;
use crate::time::TimeControl;
use std::io::{self, BufRead};
use std::thread;

pub fn uci_loop() {
    let stdin = io::stdin();
    let mut buffer = String::new();

    let mut engine = Engine::default_hash();
    let mut search_thread: Option<thread::JoinHandle<()>> = None;

    loop {
        buffer.clear();
        match stdin.lock().read_line(&mut buffer) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let cmd = buffer.trim();
        if cmd.is_empty() {
            continue;
        }

        let parts: Vec<&str> = cmd.split_whitespace().collect();
        match parts[0] {
            "uci" => {
                println!("id name Persona");
                println!("id author persona developers");
                println!("option name Hash type spin default 64 min 1 max 1024");
                println!("option name Threads type spin default 1 min 1 max 1");
                println!("option name HumanSelect type check default true");
                println!("option name HumanTemperature type spin default 100 min 0 max 200");
                println!("option name HumanNoiseCp type spin default 0 min 0 max 50");
                println!("option name CandidateMarginCp type spin default 200 min 0 max 400");
                println!("option name CandidateMovesMax type spin default 10 min 1 max 30");
                println!("option name RiskAppetite type spin default 100 min 0 max 200");
                println!("option name SacrificeBias type spin default 100 min 0 max 200");
                println!("option name SimplicityBias type spin default 100 min 0 max 200");
                println!("option name TradeBias type spin default 100 min 0 max 200");
                println!("option name HumanHardFloorCp type spin default 300 min 0 max 600");
                println!("option name HumanOpeningSanity type spin default 100 min 0 max 200");
                println!("option name HumanTopKOverride type spin default 0 min 0 max 10");
                println!("option name RandomSeed type spin default 0 min 0 max 2147483647");
                println!("uciok");
            }
            "isready" => println!("readyok"),
            "ucinewgame" => {
                engine.new_game();
                engine.set_position(START_FEN, &[]);
            }
            "position" => {
                join_search(&mut search_thread);
                handle_position(&mut engine, &parts);
            }
            "go" => {
                engine.stop();
                join_search(&mut search_thread);

                let (control, depth) = parse_go(&parts);
                let worker = engine.clone();
                let builder = thread::Builder::new()
                    .name("search_thread".into())
                    .stack_size(32 * 1024 * 1024);
                search_thread = builder
                    .spawn(move || {
                        worker.go(control, depth, true);
                    })
                    .ok();
            }
            "stop" => {
                engine.stop();
                join_search(&mut search_thread);
            }
            "setoption" => {
                handle_setoption(&mut engine, &parts);
            }
            "quit" => {
                engine.stop();
                join_search(&mut search_thread);
                break;
            }
            _ => {}
        }
    }
}

fn join_search(search_thread: &mut Option<thread::JoinHandle<()>>) {
    if let Some(handle) = search_thread.take() {
        let _ = handle.join();
    }
}

fn handle_position(engine: &mut Engine, parts: &[&str]) {
    if parts.len() < 2 {
        return;
    }

    let (fen, moves_idx) = if parts[1] == "startpos" {
        let idx = if parts.len() > 2 && parts[2] == "moves" {
            3
        } else {
            parts.len()
        };
        (START_FEN.to_string(), idx)
    } else if parts[1] == "fen" {
        let mut fen = String::new();
        let mut i = 2;
        while i < parts.len() && parts[i] != "moves" {
            fen.push_str(parts[i]);
            fen.push(' ');
            i += 1;
        }
        let idx = if i < parts.len() { i + 1 } else { parts.len() };
        (fen, idx)
    } else {
        return;
    };

    let moves: Vec<&str> = parts[moves_idx.min(parts.len())..].to_vec();
    if !engine.set_position(fen.trim(), &moves) {
        log::warn!("position command with malformed FEN: {}", fen.trim());
    }
}

fn handle_setoption(engine: &mut Engine, parts: &[&str]) {
    // setoption name <Name> value <Value>
    let mut name = None;
    let mut value = None;
    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "name" if i + 1 < parts.len() => {
                name = Some(parts[i + 1]);
                i += 1;
            }
            "value" if i + 1 < parts.len() => {
                value = Some(parts[i + 1]);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    let (Some(name), Some(value)) = (name, value) else {
        return;
    };

    match name {
        "Hash" => {
            if let Ok(mb) = value.parse::<usize>() {
                engine.set_hash_size(mb.clamp(1, 1024));
            }
        }
        "Threads" => {
            if let Ok(n) = value.parse::<usize>() {
                engine.set_threads(n);
            }
        }
        _ => {
            if !engine.personality.set(name, value) {
                log::info!("ignoring unknown option {}", name);
            }
        }
    }
}

fn parse_go(parts: &[&str]) -> (TimeControl, Option<u8>) {
    let mut depth = None;
    let mut wtime = None;
    let mut btime = None;
    let mut winc = 0u64;
    let mut binc = 0u64;
    let mut movetime = None;
    let mut infinite = false;

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" if i + 1 < parts.len() => {
                depth = parts[i + 1].parse().ok();
                i += 1;
            }
            "wtime" if i + 1 < parts.len() => {
                wtime = parts[i + 1].parse().ok();
                i += 1;
            }
            "btime" if i + 1 < parts.len() => {
                btime = parts[i + 1].parse().ok();
                i += 1;
            }
            "winc" if i + 1 < parts.len() => {
                winc = parts[i + 1].parse().unwrap_or(0);
                i += 1;
            }
            "binc" if i + 1 < parts.len() => {
                binc = parts[i + 1].parse().unwrap_or(0);
                i += 1;
            }
            "movetime" if i + 1 < parts.len() => {
                movetime = parts[i + 1].parse().ok();
                i += 1;
            }
            "infinite" => infinite = true,
            _ => {}
        }
        i += 1;
    }

    let control = if infinite {
        TimeControl::Infinite
    } else if let Some(mt) = movetime {
        TimeControl::MoveTime(mt)
    } else if wtime.is_some() || btime.is_some() {
        TimeControl::GameTime {
            wtime: wtime.unwrap_or(0),
            btime: btime.unwrap_or(0),
            winc,
            binc,
        }
    } else {
        TimeControl::Infinite
    };

    (control, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::START_FEN;

    #[test]
    fn parse_go_variants() {
        let parts: Vec<&str> = "go movetime 1500".split_whitespace().collect();
        let (control, depth) = parse_go(&parts);
        assert!(matches!(control, TimeControl::MoveTime(1500)));
        assert_eq!(depth, None);

        let parts: Vec<&str> = "go depth 7".split_whitespace().collect();
        let (control, depth) = parse_go(&parts);
        assert!(matches!(control, TimeControl::Infinite));
        assert_eq!(depth, Some(7));

        let parts: Vec<&str> = "go wtime 60000 btime 55000 winc 1000 binc 1000"
            .split_whitespace()
            .collect();
        let (control, _) = parse_go(&parts);
        match control {
            TimeControl::GameTime {
                wtime,
                btime,
                winc,
                binc,
            } => {
                assert_eq!(wtime, 60_000);
                assert_eq!(btime, 55_000);
                assert_eq!(winc, 1_000);
                assert_eq!(binc, 1_000);
            }
            _ => panic!("expected game time control"),
        }

        let parts: Vec<&str> = "go infinite".split_whitespace().collect();
        let (control, _) = parse_go(&parts);
        assert!(matches!(control, TimeControl::Infinite));
    }

    #[test]
    fn position_command_installs_game_line() {
        let mut engine = Engine::new(1);
        let parts: Vec<&str> = "position startpos moves e2e4 e7e5 g1f3"
            .split_whitespace()
            .collect();
        handle_position(&mut engine, &parts);
        assert_eq!(engine.position().fullmove_number, 2);
        assert_eq!(engine.position().side_to_move, crate::position::BLACK);

        // An illegal move ends the line but keeps what was applied.
        let parts: Vec<&str> = "position startpos moves e2e4 e2e4 e7e5"
            .split_whitespace()
            .collect();
        handle_position(&mut engine, &parts);
        assert_eq!(
            engine.position().to_fen(),
            crate::engine::apply_uci_move(START_FEN, "e2e4")
        );

        let parts: Vec<&str> = "position fen 8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"
            .split_whitespace()
            .collect();
        handle_position(&mut engine, &parts);
        assert_eq!(
            engine.position().to_fen(),
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1"
        );
    }

    #[test]
    fn setoption_routes_to_personality() {
        let mut engine = Engine::new(1);
        let parts: Vec<&str> = "setoption name HumanTemperature value 160"
            .split_whitespace()
            .collect();
        handle_setoption(&mut engine, &parts);
        assert_eq!(engine.personality.human_temperature, 160);

        let parts: Vec<&str> = "setoption name HumanSelect value false"
            .split_whitespace()
            .collect();
        handle_setoption(&mut engine, &parts);
        assert!(!engine.personality.human_select);
    }
}
