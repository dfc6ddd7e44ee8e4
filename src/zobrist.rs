use std::sync::OnceLock;

static PIECE_KEYS: OnceLock<[[u64; 64]; 12]> = OnceLock::new();
static CASTLING_KEYS: OnceLock<[u64; 16]> = OnceLock::new();
static EN_PASSANT_KEYS: OnceLock<[u64; 8]> = OnceLock::new();
static SIDE_KEY: OnceLock<u64> = OnceLock::new();

// Deterministic key generator; the fixed seed keeps hashes stable across runs.
struct KeyGen {
    state: u32,
}

impl KeyGen {
    fn new(seed: u32) -> Self {
        KeyGen { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
    fn next_u64(&mut self) -> u64 {
        let n1 = self.next_u32() as u64;
        let n2 = self.next_u32() as u64;
        let n3 = self.next_u32() as u64;
        let n4 = self.next_u32() as u64;
        n1 | (n2 << 16) | (n3 << 32) | (n4 << 48)
    }
}

pub fn init_zobrist() {
    if PIECE_KEYS.get().is_some() {
        return;
    }
    let mut rng = KeyGen::new(0x2545F491);

    let mut p_keys = [[0; 64]; 12];
    for piece in 0..12 {
        for square in 0..64 {
            p_keys[piece][square] = rng.next_u64();
        }
    }

    let mut c_keys = [0; 16];
    for key in c_keys.iter_mut() {
        *key = rng.next_u64();
    }
    let _ = CASTLING_KEYS.set(c_keys);

    let mut ep_keys = [0; 8];
    for key in ep_keys.iter_mut() {
        *key = rng.next_u64();
    }
    let _ = EN_PASSANT_KEYS.set(ep_keys);

    let _ = SIDE_KEY.set(rng.next_u64());

    // PIECE_KEYS doubles as the "already initialized" marker, so it is
    // published last.
    let _ = PIECE_KEYS.set(p_keys);
}

// Accessors
#[inline(always)]
pub fn piece_key(piece: usize, sq: usize) -> u64 {
    PIECE_KEYS.get().expect("zobrist not init")[piece][sq]
}

#[inline(always)]
pub fn castling_key(rights: u8) -> u64 {
    CASTLING_KEYS.get().expect("zobrist not init")[rights as usize]
}

#[inline(always)]
pub fn en_passant_key(file: u8) -> u64 {
    EN_PASSANT_KEYS.get().expect("zobrist not init")[file as usize]
}

#[inline(always)]
pub fn side_key() -> u64 {
    *SIDE_KEY.get().expect("zobrist not init")
}
