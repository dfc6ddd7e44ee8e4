use crate::eval;
use crate::human;
use crate::movegen::{self, MoveGenerator, MoveList};
use crate::personality::PersonalityParams;
use crate::position::{move_to_uci, Move, Position, FLAG_CASTLE, FLAG_PROMOTION, NO_PIECE, WHITE};
use crate::rules::{self, PositionHistory};
use crate::time::TimeManager;
use crate::tt::{TranspositionTable, BOUND_EXACT, BOUND_LOWER, BOUND_UPPER};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const MAX_PLY: usize = 128;
pub const INFINITY: i32 = 32000;
pub const MATE: i32 = 31000;
pub const MATE_BOUND: i32 = 30000;

const HISTORY_CAP: i32 = 10_000;
const SEE_PRUNE_THRESHOLD: i32 = -100;
const DELTA_MARGIN: i32 = 975;
const NULL_MOVE_REDUCTION: u8 = 2;
const NULL_MOVE_MATERIAL: i32 = 400;
const MIN_OPENING_DEPTH: u8 = 3;
const OPENING_PLIES: u32 = 10;

pub const PIECE_VALUES: [i32; 13] = [
    100, 320, 330, 500, 900, 20000, 100, 320, 330, 500, 900, 20000, 0,
];

/// Optional diagnostics; emitted as a single debug log line per search.
#[derive(Clone, Copy, Default)]
pub struct Counters {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_probes: u64,
    pub tt_hits: u64,
    pub tt_stores: u64,
    pub beta_cutoffs: u64,
    pub alpha_improves: u64,
    pub stand_pat_cutoffs: u64,
    pub delta_prunes: u64,
    pub see_skips: u64,
}

/// Per-search tables. A fresh context is created for every `search` call; only
/// the transposition table persists across calls.
pub struct SearchData {
    pub killers: [[Move; 2]; MAX_PLY + 1],
    pub history: [[i32; 64]; 64],
}

impl SearchData {
    pub fn new() -> Self {
        Self {
            killers: [[Move::NULL; 2]; MAX_PLY + 1],
            history: [[0; 64]; 64],
        }
    }

    fn history_bonus(&mut self, mv: Move, depth: u8) {
        let from = mv.source() as usize;
        let to = mv.target() as usize;
        self.history[from][to] += (depth as i32) * (depth as i32);

        // Whole-table halving once any cell runs past the cap.
        if self.history[from][to] > HISTORY_CAP {
            for row in self.history.iter_mut() {
                for cell in row.iter_mut() {
                    *cell = (*cell / 2).max(0);
                }
            }
        }
    }

    fn killer_update(&mut self, ply: usize, mv: Move) {
        if ply <= MAX_PLY && self.killers[ply][0] != mv {
            self.killers[ply][1] = self.killers[ply][0];
            self.killers[ply][0] = mv;
        }
    }
}

impl Default for SearchData {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SearchInfo<'a> {
    pub data: &'a mut SearchData,
    pub params: &'a PersonalityParams,
    pub tt: &'a TranspositionTable,
    pub history: PositionHistory,
    pub time: TimeManager,
    pub stop_signal: Arc<AtomicBool>,
    pub stopped: bool,
    pub counters: Counters,
    pub seldepth: u8,
}

impl<'a> SearchInfo<'a> {
    #[inline(always)]
    fn check_time(&mut self) {
        if self.counters.nodes % 1024 == 0 {
            if self.stop_signal.load(Ordering::Relaxed) || self.time.hard_limit_reached() {
                self.stopped = true;
            }
        }
    }
}

// --- MATE SCORE PLY ADJUSTMENT ---
// TT scores are stored relative to the storing node so mate distances stay
// correct when probed from a different root depth.
#[inline(always)]
pub(crate) fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_BOUND {
        score + ply as i32
    } else if score < -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

#[inline(always)]
pub(crate) fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_BOUND {
        score - ply as i32
    } else if score < -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

// --- SEE (Static Exchange Evaluation) ---
// Full iterative swap: both sides recapture with the least valuable attacker
// until one side stands pat; returns the material balance at termination from
// the mover's point of view.
pub fn see(position: &Position, mv: Move) -> i32 {
    let from = mv.source();
    let to = mv.target();
    let mut piece = position.piece_at(from);
    let victim = position.piece_at(to);

    if victim == NO_PIECE && mv.flag() != crate::position::FLAG_EN_PASSANT {
        if let Some(kind) = mv.promotion_kind() {
            return PIECE_VALUES[kind] - PIECE_VALUES[0];
        }
        return 0;
    }

    let mut gain = [0i32; 32];
    let mut d = 0;
    gain[d] = PIECE_VALUES[victim];

    let mut occ = position.occupancies[crate::position::BOTH];
    if victim == NO_PIECE {
        // En passant: the captured pawn is not on the target square.
        gain[0] = PIECE_VALUES[0];
        let ep_sq = if position.side_to_move == WHITE {
            to - 8
        } else {
            to + 8
        };
        occ.pop_bit(ep_sq);
    }

    let mut side = 1 - position.side_to_move;
    let mut attackers = attackers_to(position, to, occ);
    attackers.pop_bit(from);
    occ.pop_bit(from);

    // `piece` is whatever currently sits on the target square; each round the
    // least valuable attacker of `side` takes it.
    loop {
        let mut next_piece = 0usize;
        let lva = least_valuable_attacker(position, attackers, side, &mut next_piece);
        if lva == 64 {
            break;
        }

        d += 1;
        gain[d] = PIECE_VALUES[piece] - gain[d - 1];
        // Neither side can profit from continuing the sequence.
        if gain[d].max(-gain[d - 1]) < 0 {
            break;
        }

        piece = next_piece;
        side = 1 - side;
        attackers.pop_bit(lva);
        occ.pop_bit(lva);
    }

    while d > 0 {
        gain[d - 1] = -((-gain[d - 1]).max(gain[d]));
        d -= 1;
    }
    gain[0]
}

fn attackers_to(
    position: &Position,
    sq: u8,
    occ: crate::bitboard::Bitboard,
) -> crate::bitboard::Bitboard {
    use crate::bitboard::*;
    use crate::position::*;

    let mut attackers = Bitboard(0);

    if sq >= 8 {
        if sq % 8 > 0 && position.bitboards[WP].get_bit(sq - 9) {
            attackers.set_bit(sq - 9);
        }
        if sq % 8 < 7 && position.bitboards[WP].get_bit(sq - 7) {
            attackers.set_bit(sq - 7);
        }
    }
    if sq < 56 {
        if sq % 8 > 0 && position.bitboards[BP].get_bit(sq + 7) {
            attackers.set_bit(sq + 7);
        }
        if sq % 8 < 7 && position.bitboards[BP].get_bit(sq + 9) {
            attackers.set_bit(sq + 9);
        }
    }

    attackers =
        attackers | (get_knight_attacks(sq) & (position.bitboards[WN] | position.bitboards[BN]));
    attackers =
        attackers | (get_king_attacks(sq) & (position.bitboards[WK] | position.bitboards[BK]));

    let rooks = position.bitboards[WR]
        | position.bitboards[BR]
        | position.bitboards[WQ]
        | position.bitboards[BQ];
    let bishops = position.bitboards[WB]
        | position.bitboards[BB]
        | position.bitboards[WQ]
        | position.bitboards[BQ];

    attackers = attackers | (get_rook_attacks(sq, occ) & rooks);
    attackers = attackers | (get_bishop_attacks(sq, occ) & bishops);

    attackers
}

fn least_valuable_attacker(
    position: &Position,
    attackers: crate::bitboard::Bitboard,
    side: usize,
    piece: &mut usize,
) -> u8 {
    let start = if side == WHITE { 0 } else { 6 };
    for piece_idx in start..start + 6 {
        let subset = attackers & position.bitboards[piece_idx];
        if subset.0 != 0 {
            *piece = piece_idx;
            return subset.get_lsb_index() as u8;
        }
    }
    64
}

// --- MOVE ORDERING ---
const MVV_LVA: [[i32; 6]; 6] = [
    [105, 104, 103, 102, 101, 100],
    [205, 204, 203, 202, 201, 200],
    [305, 304, 303, 302, 301, 300],
    [405, 404, 403, 402, 401, 400],
    [505, 504, 503, 502, 501, 500],
    [605, 604, 603, 602, 601, 600],
];

fn score_move(mv: Move, tt_move: Move, info: &SearchInfo, ply: usize, position: &Position) -> i32 {
    if !tt_move.is_null() && mv == tt_move {
        return 200_000;
    }

    if position.is_capture(mv) {
        let attacker = position.piece_at(mv.source());
        let victim = if mv.flag() == crate::position::FLAG_EN_PASSANT {
            0
        } else {
            position.piece_at(mv.target())
        };
        let score = 100_000 + MVV_LVA[victim % 6][attacker % 6];
        // Losing captures drop below killers and quiet history.
        return if see(position, mv) >= 0 { score } else { 0 };
    }

    if mv.flag() == FLAG_PROMOTION {
        return 90_000;
    }

    // Early-game nudges: castling and central pawn pushes are tried before
    // ordinary quiets.
    if mv.flag() == FLAG_CASTLE {
        return 82_000;
    }
    if position.fullmove_number <= 3 {
        let piece = position.piece_at(mv.source());
        if piece % 6 == 0 {
            let t = mv.target();
            if t == 27 || t == 28 || t == 35 || t == 36 {
                return 81_000;
            }
        }
    }

    if ply <= MAX_PLY {
        if info.data.killers[ply][0] == mv {
            return 80_000;
        }
        if info.data.killers[ply][1] == mv {
            return 79_000;
        }
    }

    info.data.history[mv.source() as usize][mv.target() as usize].min(70_000)
}

// --- QUIESCENCE ---
fn quiescence(
    position: &Position,
    mut alpha: i32,
    beta: i32,
    info: &mut SearchInfo,
    ply: usize,
) -> i32 {
    if ply > info.seldepth as usize {
        info.seldepth = ply as u8;
    }
    if ply >= MAX_PLY {
        return eval::evaluate(position, info.params, alpha, beta);
    }

    info.counters.nodes += 1;
    info.counters.qnodes += 1;
    info.check_time();
    if info.stopped {
        return 0;
    }

    let in_check = movegen::is_in_check(position);

    if !in_check {
        let stand_pat = eval::evaluate(position, info.params, alpha, beta);
        if stand_pat >= beta {
            info.counters.stand_pat_cutoffs += 1;
            return beta;
        }
        if stand_pat + DELTA_MARGIN < alpha {
            info.counters.delta_prunes += 1;
            return alpha;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }
    }

    let legal = MoveGenerator::legal(position);
    if in_check && legal.count == 0 {
        return -MATE + ply as i32;
    }

    // In check every evasion is searched; otherwise only tactical moves.
    let mut moves = MoveList::new();
    let mut scores = [0i32; 256];
    for &mv in legal.as_slice() {
        let is_capture = position.is_capture(mv);
        if !in_check {
            if !is_capture && mv.flag() != FLAG_PROMOTION {
                continue;
            }
            if is_capture && see(position, mv) < SEE_PRUNE_THRESHOLD {
                info.counters.see_skips += 1;
                continue;
            }
        }
        let mut score = 0;
        if mv.flag() == FLAG_PROMOTION {
            score += 1_000_000;
        }
        if is_capture {
            let attacker = position.piece_at(mv.source());
            let victim = if mv.flag() == crate::position::FLAG_EN_PASSANT {
                0
            } else {
                position.piece_at(mv.target())
            };
            score += PIECE_VALUES[victim] * 10 - PIECE_VALUES[attacker] + see(position, mv);
        }
        scores[moves.count] = score;
        moves.push(mv);
    }

    for i in 0..moves.count {
        let mut best_idx = i;
        for j in (i + 1)..moves.count {
            if scores[j] > scores[best_idx] {
                best_idx = j;
            }
        }
        scores.swap(i, best_idx);
        moves.moves.swap(i, best_idx);
        let mv = moves.moves[i];

        let next = position.apply_move(mv);
        let score = -quiescence(&next, -beta, -alpha, info, ply + 1);
        if info.stopped {
            return 0;
        }

        if score >= beta {
            info.counters.beta_cutoffs += 1;
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

// --- ALPHA-BETA ---
fn alpha_beta(
    position: &Position,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    info: &mut SearchInfo,
    ply: usize,
    allow_null: bool,
) -> i32 {
    info.counters.nodes += 1;
    info.check_time();
    if info.stopped {
        return 0;
    }

    if ply > 0 && rules::is_draw(position, &info.history) {
        return 0;
    }

    // Mate distance pruning.
    alpha = alpha.max(-MATE + ply as i32);
    beta = beta.min(MATE - ply as i32);
    if alpha >= beta {
        return alpha;
    }

    if ply >= MAX_PLY {
        return eval::evaluate(position, info.params, alpha, beta);
    }

    let legal = MoveGenerator::legal(position);
    let in_check = movegen::is_in_check(position);

    if legal.count == 0 {
        return if in_check { -MATE + ply as i32 } else { 0 };
    }

    // TT probe. The stored move is only trusted after re-validation against
    // the legal move list of this exact position.
    let original_alpha = alpha;
    let mut tt_move = Move::NULL;
    info.counters.tt_probes += 1;
    if let Some(entry) = info.tt.probe(position.hash) {
        let move_valid = entry.best_move.is_null() || legal.contains(entry.best_move);
        if move_valid {
            info.counters.tt_hits += 1;
            tt_move = entry.best_move;

            if ply > 0 && entry.depth >= depth {
                let score = score_from_tt(entry.score, ply);
                match entry.flag {
                    BOUND_EXACT => return score,
                    BOUND_LOWER => alpha = alpha.max(score),
                    BOUND_UPPER => beta = beta.min(score),
                    _ => {}
                }
                if alpha >= beta {
                    return score;
                }
            }
        }
    }

    if depth == 0 {
        return quiescence(position, alpha, beta, info, ply);
    }

    // Null move pruning: hand the opponent a free move; if the reduced search
    // still beats beta the node is not worth exploring. Skipped in check and
    // without enough non-pawn material (zugzwang guard).
    if allow_null
        && !in_check
        && ply > 0
        && depth >= 3
        && position.non_pawn_material(position.side_to_move) > NULL_MOVE_MATERIAL
    {
        let null = position.make_null_move();
        let reduced = depth - 1 - NULL_MOVE_REDUCTION.min(depth - 1);
        let score = -alpha_beta(&null, reduced, -beta, -beta + 1, info, ply + 1, false);
        if info.stopped {
            return 0;
        }
        if score >= beta {
            info.counters.beta_cutoffs += 1;
            return beta;
        }
    }

    // Check extension.
    let depth = if in_check {
        (depth + 1).min(MAX_PLY as u8)
    } else {
        depth
    };

    let mut moves = legal;
    let mut scores = [0i32; 256];
    for i in 0..moves.count {
        scores[i] = score_move(moves.moves[i], tt_move, info, ply, position);
    }

    let mut best_score = -INFINITY;
    let mut best_move = Move::NULL;

    info.history.push(position.hash);

    for i in 0..moves.count {
        let mut best_idx = i;
        for j in (i + 1)..moves.count {
            if scores[j] > scores[best_idx] {
                best_idx = j;
            }
        }
        scores.swap(i, best_idx);
        moves.moves.swap(i, best_idx);
        let mv = moves.moves[i];

        let next = position.apply_move(mv);
        let score = -alpha_beta(&next, depth - 1, -beta, -alpha, info, ply + 1, true);
        if info.stopped {
            info.history.pop();
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = mv;
        }
        if score > alpha {
            alpha = score;
            info.counters.alpha_improves += 1;
        }
        if alpha >= beta {
            info.counters.beta_cutoffs += 1;
            if !position.is_capture(mv) && mv.flag() != FLAG_PROMOTION {
                info.data.killer_update(ply, mv);
                info.data.history_bonus(mv, depth);
            }
            break;
        }
    }

    info.history.pop();

    let flag = if best_score >= beta {
        BOUND_LOWER
    } else if best_score <= original_alpha {
        BOUND_UPPER
    } else {
        BOUND_EXACT
    };
    info.counters.tt_stores += 1;
    info.tt
        .store(position.hash, score_to_tt(best_score, ply), best_move, depth, flag);

    best_score
}

// --- DRIVER ---
#[derive(Clone, Debug, Default)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: i32,
    pub depth: u8,
    pub nodes: u64,
    pub time_ms: u64,
    pub pv: Vec<Move>,
}

fn extract_pv(position: &Position, tt: &TranspositionTable, max_len: u8) -> Vec<Move> {
    let mut pv = Vec::new();
    let mut current = *position;
    let mut seen = Vec::new();

    for _ in 0..max_len {
        if seen.contains(&current.hash) {
            break;
        }
        seen.push(current.hash);

        let mv = tt.get_move(current.hash);
        if mv.is_null() {
            break;
        }
        let legal = MoveGenerator::legal(&current);
        if !legal.contains(mv) {
            break;
        }
        pv.push(mv);
        current = current.apply_move(mv);
    }
    pv
}

pub fn format_score(score: i32) -> String {
    if score > MATE_BOUND {
        format!("mate {}", (MATE - score + 1) / 2)
    } else if score < -MATE_BOUND {
        format!("mate -{}", (MATE + score + 1) / 2)
    } else {
        format!("cp {}", score)
    }
}

/// Iterative deepening. Returns the best completed-depth result; when
/// cancellation lands before depth 1 completes, the first legal root move is
/// substituted so an illegal or null move is never returned from a position
/// that has moves.
#[allow(clippy::too_many_arguments)]
pub fn run_search(
    position: &Position,
    time: TimeManager,
    max_depth: u8,
    tt: &TranspositionTable,
    stop_signal: Arc<AtomicBool>,
    game_history: &[u64],
    params: &PersonalityParams,
    report: bool,
) -> SearchResult {
    let start = Instant::now();
    let mut data = SearchData::new();
    let mut info = SearchInfo {
        data: &mut data,
        params,
        tt,
        history: PositionHistory::from_hashes(game_history),
        time,
        stop_signal,
        stopped: false,
        counters: Counters::default(),
        seldepth: 0,
    };

    let root_moves = MoveGenerator::legal(position);
    let mut result = SearchResult::default();
    let max_depth = max_depth.clamp(1, MAX_PLY as u8);
    let in_opening = position.game_ply() < OPENING_PLIES;

    for depth in 1..=max_depth {
        info.seldepth = 0;
        let score = alpha_beta(position, depth, -INFINITY, INFINITY, &mut info, 0, true);
        if info.stopped {
            break;
        }

        result.score = score;
        result.depth = depth;
        let tt_best = tt.get_move(position.hash);
        if !tt_best.is_null() && root_moves.contains(tt_best) {
            result.best_move = tt_best;
            result.pv = extract_pv(position, tt, depth);
        }

        if report {
            let elapsed = start.elapsed().as_millis() as u64;
            let nps = if elapsed > 0 {
                info.counters.nodes * 1000 / elapsed
            } else {
                0
            };
            let pv_str = result
                .pv
                .iter()
                .map(|&m| move_to_uci(m))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "info depth {} seldepth {} score {} nodes {} nps {} hashfull {} time {} pv {}",
                depth,
                info.seldepth,
                format_score(score),
                info.counters.nodes,
                nps,
                tt.hashfull(),
                elapsed,
                pv_str
            );
        }

        if info.time.soft_limit_reached() {
            // Opening positions get at least a shallow full look when the
            // hard limit still allows it.
            let keep_going =
                in_opening && depth < MIN_OPENING_DEPTH && !info.time.hard_limit_reached();
            if !keep_going {
                break;
            }
        }
    }

    // Safety net: never return a move that is not legal at the root.
    if !result.best_move.is_null() && !root_moves.contains(result.best_move) {
        result.best_move = Move::NULL;
    }
    if result.best_move.is_null() && root_moves.count > 0 {
        result.best_move = root_moves.moves[0];
    }

    // Root human selection, replacing the engine move with a humanly
    // plausible alternative. The PV stays the searched line.
    if params.human_select && !result.best_move.is_null() {
        let pick = human::pick_human_move(position, params);
        if !pick.is_null() {
            if root_moves.contains(pick) {
                result.best_move = pick;
            } else {
                log::warn!(
                    "human selection produced illegal move {} in {}; using search move",
                    move_to_uci(pick),
                    position.to_fen()
                );
            }
        }
    }

    result.nodes = info.counters.nodes;
    result.time_ms = start.elapsed().as_millis() as u64;

    let c = info.counters;
    log::debug!(
        "search done: nodes {} qnodes {} tt {}/{}/{} cutoffs {} standpat {} delta {} see_skips {}",
        c.nodes,
        c.qnodes,
        c.tt_hits,
        c.tt_probes,
        c.tt_stores,
        c.beta_cutoffs,
        c.stand_pat_cutoffs,
        c.delta_prunes,
        c.see_skips
    );

    if report {
        if result.best_move.is_null() {
            println!("bestmove 0000");
        } else {
            println!("bestmove {}", move_to_uci(result.best_move));
        }
    }

    result
}
