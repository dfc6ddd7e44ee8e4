use crate::eval;
use crate::movegen::MoveGenerator;
use crate::personality::PersonalityParams;
use crate::position::{move_to_uci, Move, Position, KNIGHT, PAWN};
use crate::search::INFINITY;

/// A root move with its one-ply evaluation, decorated with a sampling weight
/// and probability during selection.
#[derive(Clone, Copy, Debug)]
pub struct CandidateMove {
    pub mv: Move,
    pub score: i32,
    pub weight: f64,
    pub probability: f64,
}

/// Lehmer-style linear congruential generator, modulus 2^31 - 1. A value type
/// owned by the selection call; the same seed reproduces the same game.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const A: u64 = 1_103_515_245;
    const C: u64 = 12_345;
    const M: u64 = 2_147_483_647;

    pub fn new(seed: u32) -> Self {
        let mut state = seed as u64 % Self::M;
        if state == 0 {
            state = 1;
        }
        Self { state }
    }

    /// Uniform sample in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = (Self::A * self.state + Self::C) % Self::M;
        self.state as f64 / Self::M as f64
    }
}

/// Effective seed: 0 means "use a non-deterministic source".
fn resolve_seed(params: &PersonalityParams) -> u32 {
    if params.random_seed != 0 {
        params.random_seed
    } else {
        (rand::random::<u32>() & 0x7FFF_FFFF).max(1)
    }
}

/// Edge knight or pawn moves out of the initial development area; these get
/// penalized in the opening so the sampler does not open with Na3 or h4.
fn is_edge_move_opening(position: &Position, mv: Move) -> bool {
    let from = mv.source();
    let piece_type = position.piece_at(from) % 6;
    let file = from % 8;
    let rank = from / 8;

    if piece_type == KNIGHT {
        return (rank == 2 || rank == 5) && (file <= 1 || file >= 6);
    }
    if piece_type == PAWN {
        return (rank == 1 || rank == 6) && (file == 0 || file == 7);
    }
    false
}

/// Root candidates: every legal move scored by a one-ply static evaluation of
/// the real successor position, filtered through the guardrails.
pub fn collect_candidates(position: &Position, params: &PersonalityParams) -> Vec<CandidateMove> {
    let legal = MoveGenerator::legal(position);
    let mut candidates: Vec<CandidateMove> = legal
        .as_slice()
        .iter()
        .map(|&mv| {
            let next = position.apply_move(mv);
            CandidateMove {
                mv,
                score: -eval::evaluate(&next, params, -INFINITY, INFINITY),
                weight: 0.0,
                probability: 0.0,
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    if candidates.is_empty() {
        return candidates;
    }
    let best = candidates[0].score;

    // Guardrail 1: hard floor below the best candidate.
    let floor = best - params.human_hard_floor_cp;
    candidates.retain(|c| c.score >= floor);

    // Guardrail 2: opening sanity, first 12 plies only.
    if position.game_ply() < 12 && params.human_opening_sanity > 0 {
        let penalty = 5 * params.human_opening_sanity;
        for c in candidates.iter_mut() {
            if is_edge_move_opening(position, c.mv) {
                c.score -= penalty;
            }
        }
        candidates.sort_by(|a, b| b.score.cmp(&a.score));
    }

    // Guardrail 3: top-K override.
    if params.human_topk_override > 0 {
        candidates.truncate(params.human_topk_override);
    }

    // Margin and count filter.
    let margin_floor = best - params.candidate_margin_cp;
    candidates.retain(|c| c.score >= margin_floor);
    candidates.truncate(params.candidate_moves_max);

    candidates
}

/// Samples a move from the candidate distribution. Returns the null move when
/// there is nothing to pick from; the caller re-validates legality and falls
/// back to the search move on any mismatch.
pub fn pick_human_move(position: &Position, params: &PersonalityParams) -> Move {
    let mut candidates = collect_candidates(position, params);
    if candidates.is_empty() {
        return Move::NULL;
    }
    if candidates.len() == 1 {
        return candidates[0].mv;
    }

    let best = candidates[0].score;
    let seed = resolve_seed(params);
    let temperature = params.human_temperature as f64 / 100.0;

    let mut total_weight = 0.0;
    for c in candidates.iter_mut() {
        let score_diff = (c.score - best) as f64 / 100.0;
        let mut weight = (score_diff / (temperature + 0.01)).exp();

        if params.human_noise_cp > 0 {
            let mut noise_rng = Lcg::new(seed ^ c.mv.raw() as u32);
            let noise =
                (noise_rng.next_f64() - 0.5) * 2.0 * params.human_noise_cp as f64 / 100.0;
            weight *= noise.exp();
        }

        if params.risk_appetite > 100 {
            let boost = (params.risk_appetite - 100) as f64 / 100.0;
            if c.score < best {
                weight *= 1.0 + boost * 0.3;
            }
        } else if params.risk_appetite < 100 {
            let penalty = (100 - params.risk_appetite) as f64 / 100.0;
            if c.score < best {
                weight *= 1.0 - penalty * 0.5;
            }
        }

        if params.simplicity_bias > 100 && c.score < best - 50 {
            let boost = (params.simplicity_bias - 100) as f64 / 100.0;
            weight *= 1.0 - boost * 0.3;
        }

        c.weight = weight;
        total_weight += weight;
    }

    if total_weight <= 0.0 {
        return candidates[0].mv;
    }
    for c in candidates.iter_mut() {
        c.probability = c.weight / total_weight;
    }

    for c in &candidates {
        log::debug!(
            "candidate {} score={} prob={:.1}%",
            move_to_uci(c.mv),
            c.score,
            c.probability * 100.0
        );
    }

    let mut sample_rng = Lcg::new(seed.wrapping_add(12_345));
    let r = sample_rng.next_f64();
    let mut cumulative = 0.0;
    for c in &candidates {
        cumulative += c.probability;
        if r <= cumulative {
            return c.mv;
        }
    }
    candidates[0].mv
}
