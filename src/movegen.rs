use crate::bitboard;
use crate::position::{
    Move, Position, BB, BK, BLACK, BN, BOTH, BP, BQ, BR, CASTLE_BK, CASTLE_BQ, CASTLE_WK,
    CASTLE_WQ, FLAG_CASTLE, FLAG_EN_PASSANT, FLAG_NORMAL, KNIGHT, NO_EP, QUEEN, WB, WHITE, WK, WN,
    WP, WQ, WR,
};

#[derive(Clone, Copy)]
pub struct MoveList {
    pub moves: [Move; 256],
    pub count: usize,
}

impl MoveList {
    pub fn new() -> Self {
        Self {
            moves: [Move::NULL; 256],
            count: 0,
        }
    }

    #[inline(always)]
    pub fn push(&mut self, m: Move) {
        if self.count < 256 {
            self.moves[self.count] = m;
            self.count += 1;
        }
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.count]
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.as_slice().iter().any(|&m| m == mv)
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MoveGenerator {
    pub list: MoveList,
}

impl MoveGenerator {
    pub fn new() -> Self {
        Self {
            list: MoveList::new(),
        }
    }

    /// All legal moves: pseudo-legal generation filtered by a king-safety
    /// check on the successor position.
    pub fn legal(position: &Position) -> MoveList {
        let mut generator = MoveGenerator::new();
        generator.generate_moves(position);

        let side = position.side_to_move;
        let mut legal = MoveList::new();
        for &mv in generator.list.as_slice() {
            let next = position.apply_move(mv);
            if !is_square_attacked(&next, next.king_square(side), next.side_to_move) {
                legal.push(mv);
            }
        }
        legal
    }

    #[inline(always)]
    fn add_promotions(&mut self, source: u8, target: u8) {
        for kind in (KNIGHT..=QUEEN).rev() {
            self.list.push(Move::promotion(source, target, kind));
        }
    }

    pub fn generate_moves(&mut self, position: &Position) {
        let side = position.side_to_move;
        let enemy = 1 - side;
        let occupancy_all = position.occupancies[BOTH];
        let occupancy_friendly = position.occupancies[side];
        let occupancy_enemy = position.occupancies[enemy];

        // PAWNS
        let (pawn_type, start_rank, promo_rank, direction) = if side == WHITE {
            (WP, 1i8, 7u8, 1i8)
        } else {
            (BP, 6, 0, -1)
        };

        let mut pawns = position.bitboards[pawn_type];
        while pawns.0 != 0 {
            let src = pawns.get_lsb_index() as u8;
            pawns.pop_bit(src);
            let rank = (src / 8) as i8;

            let target = (src as i8 + 8 * direction) as u8;
            if !occupancy_all.get_bit(target) {
                if target / 8 == promo_rank {
                    self.add_promotions(src, target);
                } else {
                    self.list.push(Move::new(src, target, FLAG_NORMAL));
                    if rank == start_rank {
                        let double = (src as i8 + 16 * direction) as u8;
                        if !occupancy_all.get_bit(double) {
                            self.list.push(Move::new(src, double, FLAG_NORMAL));
                        }
                    }
                }
            }

            let file = src % 8;
            for offset in [-1i8, 1] {
                if (file == 0 && offset == -1) || (file == 7 && offset == 1) {
                    continue;
                }
                let t = (src as i8 + 8 * direction + offset) as u8;
                if occupancy_enemy.get_bit(t) {
                    if t / 8 == promo_rank {
                        self.add_promotions(src, t);
                    } else {
                        self.list.push(Move::new(src, t, FLAG_NORMAL));
                    }
                } else if t == position.en_passant && position.en_passant != NO_EP {
                    self.list.push(Move::new(src, t, FLAG_EN_PASSANT));
                }
            }
        }

        // KNIGHTS
        let knight_type = if side == WHITE { WN } else { BN };
        let mut knights = position.bitboards[knight_type];
        while knights.0 != 0 {
            let src = knights.get_lsb_index() as u8;
            knights.pop_bit(src);
            let mut attacks = bitboard::get_knight_attacks(src) & !occupancy_friendly;
            while attacks.0 != 0 {
                let t = attacks.get_lsb_index() as u8;
                attacks.pop_bit(t);
                self.list.push(Move::new(src, t, FLAG_NORMAL));
            }
        }

        // BISHOPS
        let bishop_type = if side == WHITE { WB } else { BB };
        let mut bishops = position.bitboards[bishop_type];
        while bishops.0 != 0 {
            let src = bishops.get_lsb_index() as u8;
            bishops.pop_bit(src);
            let mut attacks =
                bitboard::get_bishop_attacks(src, occupancy_all) & !occupancy_friendly;
            while attacks.0 != 0 {
                let t = attacks.get_lsb_index() as u8;
                attacks.pop_bit(t);
                self.list.push(Move::new(src, t, FLAG_NORMAL));
            }
        }

        // ROOKS
        let rook_type = if side == WHITE { WR } else { BR };
        let mut rooks = position.bitboards[rook_type];
        while rooks.0 != 0 {
            let src = rooks.get_lsb_index() as u8;
            rooks.pop_bit(src);
            let mut attacks = bitboard::get_rook_attacks(src, occupancy_all) & !occupancy_friendly;
            while attacks.0 != 0 {
                let t = attacks.get_lsb_index() as u8;
                attacks.pop_bit(t);
                self.list.push(Move::new(src, t, FLAG_NORMAL));
            }
        }

        // QUEENS
        let queen_type = if side == WHITE { WQ } else { BQ };
        let mut queens = position.bitboards[queen_type];
        while queens.0 != 0 {
            let src = queens.get_lsb_index() as u8;
            queens.pop_bit(src);
            let mut attacks = bitboard::get_queen_attacks(src, occupancy_all) & !occupancy_friendly;
            while attacks.0 != 0 {
                let t = attacks.get_lsb_index() as u8;
                attacks.pop_bit(t);
                self.list.push(Move::new(src, t, FLAG_NORMAL));
            }
        }

        // KING
        let king_type = if side == WHITE { WK } else { BK };
        let king = position.bitboards[king_type];
        if king.0 != 0 {
            let src = king.get_lsb_index() as u8;
            let mut attacks = bitboard::get_king_attacks(src) & !occupancy_friendly;
            while attacks.0 != 0 {
                let t = attacks.get_lsb_index() as u8;
                attacks.pop_bit(t);
                self.list.push(Move::new(src, t, FLAG_NORMAL));
            }

            // CASTLING: right still held, path empty, king's start, crossing
            // and landing squares unattacked.
            if side == WHITE {
                if position.castling_rights & CASTLE_WK != 0
                    && !occupancy_all.get_bit(5)
                    && !occupancy_all.get_bit(6)
                    && !is_square_attacked(position, 4, BLACK)
                    && !is_square_attacked(position, 5, BLACK)
                    && !is_square_attacked(position, 6, BLACK)
                {
                    self.list.push(Move::new(4, 6, FLAG_CASTLE));
                }
                if position.castling_rights & CASTLE_WQ != 0
                    && !occupancy_all.get_bit(1)
                    && !occupancy_all.get_bit(2)
                    && !occupancy_all.get_bit(3)
                    && !is_square_attacked(position, 4, BLACK)
                    && !is_square_attacked(position, 3, BLACK)
                    && !is_square_attacked(position, 2, BLACK)
                {
                    self.list.push(Move::new(4, 2, FLAG_CASTLE));
                }
            } else {
                if position.castling_rights & CASTLE_BK != 0
                    && !occupancy_all.get_bit(61)
                    && !occupancy_all.get_bit(62)
                    && !is_square_attacked(position, 60, WHITE)
                    && !is_square_attacked(position, 61, WHITE)
                    && !is_square_attacked(position, 62, WHITE)
                {
                    self.list.push(Move::new(60, 62, FLAG_CASTLE));
                }
                if position.castling_rights & CASTLE_BQ != 0
                    && !occupancy_all.get_bit(57)
                    && !occupancy_all.get_bit(58)
                    && !occupancy_all.get_bit(59)
                    && !is_square_attacked(position, 60, WHITE)
                    && !is_square_attacked(position, 59, WHITE)
                    && !is_square_attacked(position, 58, WHITE)
                {
                    self.list.push(Move::new(60, 58, FLAG_CASTLE));
                }
            }
        }
    }
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_square_attacked(position: &Position, square: u8, attacker_side: usize) -> bool {
    if square >= 64 {
        return false;
    }

    // Pawn attacks, reversed: a white pawn attacks `square` from one rank below.
    if attacker_side == WHITE {
        if square >= 8 {
            if square % 8 > 0 && position.bitboards[WP].get_bit(square - 9) {
                return true;
            }
            if square % 8 < 7 && position.bitboards[WP].get_bit(square - 7) {
                return true;
            }
        }
    } else if square < 56 {
        if square % 8 > 0 && position.bitboards[BP].get_bit(square + 7) {
            return true;
        }
        if square % 8 < 7 && position.bitboards[BP].get_bit(square + 9) {
            return true;
        }
    }

    let knights = if attacker_side == WHITE {
        position.bitboards[WN]
    } else {
        position.bitboards[BN]
    };
    if (bitboard::get_knight_attacks(square) & knights).0 != 0 {
        return true;
    }

    let king = if attacker_side == WHITE {
        position.bitboards[WK]
    } else {
        position.bitboards[BK]
    };
    if (bitboard::get_king_attacks(square) & king).0 != 0 {
        return true;
    }

    let occupancy = position.occupancies[BOTH];
    let rooks = if attacker_side == WHITE {
        position.bitboards[WR] | position.bitboards[WQ]
    } else {
        position.bitboards[BR] | position.bitboards[BQ]
    };
    if (bitboard::get_rook_attacks(square, occupancy) & rooks).0 != 0 {
        return true;
    }

    let bishops = if attacker_side == WHITE {
        position.bitboards[WB] | position.bitboards[WQ]
    } else {
        position.bitboards[BB] | position.bitboards[BQ]
    };
    if (bitboard::get_bishop_attacks(square, occupancy) & bishops).0 != 0 {
        return true;
    }

    false
}

pub fn is_check(position: &Position, side: usize) -> bool {
    is_square_attacked(position, position.king_square(side), 1 - side)
}

pub fn is_in_check(position: &Position) -> bool {
    is_check(position, position.side_to_move)
}
