use crate::position::WHITE;
use std::time::Instant;

const MOVE_OVERHEAD_MS: u64 = 20;

#[derive(Clone, Copy, Debug)]
pub enum TimeControl {
    Infinite,
    MoveTime(u64),
    GameTime {
        wtime: u64,
        btime: u64,
        winc: u64,
        binc: u64,
    },
}

/// Per-move budget derived from the remaining clock. The soft limit stops
/// iterative deepening after the current depth completes; the hard limit is
/// the panic floor polled inside the search.
#[derive(Clone, Copy)]
pub struct TimeManager {
    pub start_time: Instant,
    pub soft_limit: u64,
    pub hard_limit: u64,
}

impl TimeManager {
    pub fn new(control: TimeControl, side: usize, game_ply: u32) -> Self {
        let (soft, hard) = match control {
            TimeControl::Infinite => (u64::MAX, u64::MAX),
            TimeControl::MoveTime(t) => {
                let t = t.saturating_sub(MOVE_OVERHEAD_MS).max(1);
                (t, t)
            }
            TimeControl::GameTime {
                wtime,
                btime,
                winc,
                binc,
            } => {
                let (clock, inc) = if side == WHITE {
                    (wtime, winc)
                } else {
                    (btime, binc)
                };
                let clock = clock.saturating_sub(MOVE_OVERHEAD_MS).max(50);

                let mut budget = clock / 30 + inc * 3 / 2;

                // Opening moves get a little extra thought.
                if game_ply < 10 {
                    budget = budget * 5 / 4;
                }

                let floor = (clock / 40).max(50);
                let ceiling = (clock / 8).min(30_000);
                budget = budget.clamp(floor, ceiling.max(floor));

                let hard = (budget * 2).min(ceiling.max(floor));
                (budget, hard.max(budget))
            }
        };

        Self {
            start_time: Instant::now(),
            soft_limit: soft,
            hard_limit: hard,
        }
    }

    #[inline(always)]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    #[inline(always)]
    pub fn soft_limit_reached(&self) -> bool {
        self.elapsed_ms() >= self.soft_limit
    }

    #[inline(always)]
    pub fn hard_limit_reached(&self) -> bool {
        self.elapsed_ms() >= self.hard_limit
    }
}
