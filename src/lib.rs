pub mod bitboard;
pub mod engine;
pub mod eval;
pub mod human;
pub mod logging;
pub mod movegen;
pub mod perft;
pub mod personality;
pub mod position;
pub mod rules;
pub mod search;
pub mod time;
pub mod tt;
pub mod uci;
pub mod zobrist;


use std::env;
use std::thread;

/// One-time global table setup (Zobrist keys, attack tables). Idempotent.
pub fn init() {
    zobrist::init_zobrist();
    bitboard::init_tables();
}

pub fn run_cli() {
    logging::init_logging();
    init();

    let args: Vec<String> = env::args().collect();
    if args.len() > 1 {
        match args[1].as_str() {
            "perft" => {
                perft::run_perft_suite();
                return;
            }
            "bench" => {
                let mut engine = engine::Engine::default_hash();
                engine.personality.human_select = false;
                println!("Running benchmark: startpos depth 10");
                let result = engine.search(position::START_FEN, 0, 10);
                println!(
                    "bestmove {} score {} nodes {} time {}ms",
                    position::move_to_uci(result.best_move),
                    result.score,
                    result.nodes,
                    result.time_ms
                );
                return;
            }
            _ => {}
        }
    }

    // Deep recursion lives on the UCI search thread; give it a large stack.
    let builder = thread::Builder::new()
        .name("uci_thread".into())
        .stack_size(32 * 1024 * 1024);

    let handler = builder
        .spawn(|| {
            uci::uci_loop();
        })
        .expect("failed to spawn uci thread");

    let _ = handler.join();
}
