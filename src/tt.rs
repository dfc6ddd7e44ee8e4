use crate::position::Move;
use std::sync::atomic::{AtomicU64, Ordering};

// Bound flags stored with each entry.
pub const BOUND_NONE: u8 = 0;
pub const BOUND_EXACT: u8 = 1;
pub const BOUND_UPPER: u8 = 2;
pub const BOUND_LOWER: u8 = 3;

/// One table slot: two 64-bit words. The key word stores `hash ^ data`, so a
/// torn or mismatched pair fails verification on probe instead of producing a
/// wrong hit. Every probed move must still be re-validated against the legal
/// move list of the probing position before use.
#[derive(Debug)]
struct TTEntry {
    key: AtomicU64,
    data: AtomicU64,
}

impl TTEntry {
    fn new() -> Self {
        Self {
            key: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TTProbe {
    pub score: i32,
    pub depth: u8,
    pub flag: u8,
    pub best_move: Move,
}

pub struct TranspositionTable {
    entries: Vec<TTEntry>,
    mask: usize,
}

impl TranspositionTable {
    /// Allocates the largest power-of-two entry count fitting in `mb`.
    pub fn new(mb: usize) -> Self {
        let entry_size = std::mem::size_of::<TTEntry>();
        let budget = mb.max(1) * 1024 * 1024;
        let mut count = 1usize;
        while count * 2 * entry_size <= budget {
            count *= 2;
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(TTEntry::new());
        }

        log::info!(
            "TT: {} entries ({} MB requested)",
            count,
            mb
        );

        Self {
            entries,
            mask: count - 1,
        }
    }

    pub fn clear(&self) {
        for entry in &self.entries {
            entry.key.store(0, Ordering::Relaxed);
            entry.data.store(0, Ordering::Relaxed);
        }
    }

    /// Always-replace store. Scores must already be ply-adjusted by the caller
    /// so mate distances stay meaningful across root depths.
    pub fn store(&self, hash: u64, score: i32, best_move: Move, depth: u8, flag: u8) {
        let entry = &self.entries[(hash as usize) & self.mask];

        let score_bits = (score.clamp(-32000, 32000) + 32000) as u64;
        let data = (best_move.raw() as u64)
            | (score_bits << 16)
            | ((depth as u64) << 32)
            | ((flag as u64) << 40);

        entry.data.store(data, Ordering::Release);
        entry.key.store(hash ^ data, Ordering::Release);
    }

    pub fn probe(&self, hash: u64) -> Option<TTProbe> {
        let entry = &self.entries[(hash as usize) & self.mask];
        let data = entry.data.load(Ordering::Relaxed);
        let stored_key = entry.key.load(Ordering::Acquire);

        if data == 0 || (stored_key ^ data) != hash {
            return None;
        }

        let flag = ((data >> 40) & 0xFF) as u8;
        if flag == BOUND_NONE {
            return None;
        }

        Some(TTProbe {
            score: ((data >> 16) & 0xFFFF) as i32 - 32000,
            depth: ((data >> 32) & 0xFF) as u8,
            flag,
            best_move: Move::from_raw((data & 0xFFFF) as u16),
        })
    }

    pub fn get_move(&self, hash: u64) -> Move {
        self.probe(hash).map_or(Move::NULL, |e| e.best_move)
    }

    /// Permille of sampled slots in use, for `info hashfull` reporting.
    pub fn hashfull(&self) -> usize {
        let sample = self.entries.len().min(1000);
        if sample == 0 {
            return 0;
        }
        let used = self.entries[..sample]
            .iter()
            .filter(|e| e.data.load(Ordering::Relaxed) != 0)
            .count();
        (used * 1000) / sample
    }
}
