use crate::movegen::MoveGenerator;
use crate::personality::PersonalityParams;
use crate::position::{move_to_uci, Position, START_FEN};
use crate::search::{self, SearchResult};
use crate::time::{TimeControl, TimeManager};
use crate::tt::TranspositionTable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const DEFAULT_HASH_MB: usize = 64;

/// The search API consumed by the UCI driver and the tests. One engine owns
/// one transposition table (persistent across searches for warm starts), one
/// stop flag, and the game line it was given via `set_position`.
#[derive(Clone)]
pub struct Engine {
    tt: Arc<TranspositionTable>,
    stop: Arc<AtomicBool>,
    pub personality: PersonalityParams,
    depth_limit: u8,
    position: Position,
    game_history: Vec<u64>,
}

impl Engine {
    pub fn new(hash_mb: usize) -> Self {
        crate::init();
        Self {
            tt: Arc::new(TranspositionTable::new(hash_mb)),
            stop: Arc::new(AtomicBool::new(false)),
            personality: PersonalityParams::default(),
            depth_limit: search::MAX_PLY as u8,
            position: Position::parse_fen(START_FEN).expect("start position parses"),
            game_history: Vec::new(),
        }
    }

    pub fn default_hash() -> Self {
        Self::new(DEFAULT_HASH_MB)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Installs a game line: base FEN plus a sequence of UCI moves. Unknown or
    /// illegal moves end the line (the game stays consistent with what was
    /// applied so far). The hashes of all visited positions are retained for
    /// threefold detection during search.
    pub fn set_position(&mut self, fen: &str, moves: &[&str]) -> bool {
        let Some(mut position) = Position::parse_fen(fen) else {
            return false;
        };
        self.game_history.clear();

        for uci in moves {
            let legal = MoveGenerator::legal(&position);
            let Some(&mv) = legal.as_slice().iter().find(|&&m| move_to_uci(m) == *uci) else {
                break;
            };
            self.game_history.push(position.hash);
            position = position.apply_move(mv);
        }
        self.position = position;
        true
    }

    /// Runs a search on a bare FEN under a per-move millisecond budget.
    /// `max_time_ms` of 0 means no time limit.
    pub fn search(&self, fen: &str, max_time_ms: u64, max_depth: u8) -> SearchResult {
        let Some(position) = Position::parse_fen(fen) else {
            log::warn!("search rejected malformed FEN: {}", fen);
            return SearchResult::default();
        };
        let control = if max_time_ms == 0 {
            TimeControl::Infinite
        } else {
            TimeControl::MoveTime(max_time_ms)
        };
        let time = TimeManager::new(control, position.side_to_move, position.game_ply());
        self.stop.store(false, Ordering::Relaxed);
        search::run_search(
            &position,
            time,
            max_depth.min(self.depth_limit),
            &self.tt,
            self.stop.clone(),
            &[],
            &self.personality,
            false,
        )
    }

    /// Runs a search on the installed game line; used by the UCI `go` handler.
    pub fn go(&self, control: TimeControl, depth: Option<u8>, report: bool) -> SearchResult {
        let time = TimeManager::new(control, self.position.side_to_move, self.position.game_ply());
        self.stop.store(false, Ordering::Relaxed);
        search::run_search(
            &self.position,
            time,
            depth.unwrap_or(self.depth_limit).min(self.depth_limit),
            &self.tt,
            self.stop.clone(),
            &self.game_history,
            &self.personality,
            report,
        )
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn new_game(&self) {
        self.tt.clear();
    }

    pub fn set_hash_size(&mut self, mb: usize) {
        self.tt = Arc::new(TranspositionTable::new(mb));
    }

    /// Single-threaded core; accepted for UCI compatibility.
    pub fn set_threads(&self, _threads: usize) {}

    pub fn set_depth_limit(&mut self, depth: u8) {
        self.depth_limit = depth.clamp(1, search::MAX_PLY as u8);
    }
}

/// Applies a UCI move to a FEN and returns the resulting FEN. Malformed FENs
/// and unknown or illegal moves return the input unchanged, which keeps the
/// game line consistent with what the GUI believes.
pub fn apply_uci_move(fen: &str, uci: &str) -> String {
    let Some(position) = Position::parse_fen(fen) else {
        return fen.to_string();
    };
    let legal = MoveGenerator::legal(&position);
    match legal.as_slice().iter().find(|&&m| move_to_uci(m) == uci) {
        Some(&mv) => position.apply_move(mv).to_fen(),
        None => fen.to_string(),
    }
}
