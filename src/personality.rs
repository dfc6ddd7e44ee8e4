use serde::{Deserialize, Serialize};
use std::io::Write;

/// Style knobs consumed by the root human-selection layer and the evaluation.
/// All percentage-style fields are neutral at 100.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PersonalityParams {
    /// Max score gap from the best move for a root candidate (0..400 cp).
    pub candidate_margin_cp: i32,
    /// Hard cap on the candidate count (1..30).
    pub candidate_moves_max: usize,
    /// Enable root sampling; off means the search move is always played.
    pub human_select: bool,
    /// Softmax temperature x100 (0..200). 0 degenerates to argmax.
    pub human_temperature: i32,
    /// Per-move multiplicative noise amplitude in centipawns (0..50).
    pub human_noise_cp: i32,
    /// PRNG seed; 0 means a nondeterministic seed is drawn per game.
    pub random_seed: u32,
    /// >100 prefers inferior-score candidates more (0..200).
    pub risk_appetite: i32,
    /// Scales down the material term weight; applied via evaluation (0..200).
    pub sacrifice_bias: i32,
    /// >100 penalizes clearly inferior candidates extra (0..200).
    pub simplicity_bias: i32,
    /// >100 rewards simplification for the side ahead; via evaluation (0..200).
    pub trade_bias: i32,
    /// Absolute floor below the best candidate score (0..600 cp).
    pub human_hard_floor_cp: i32,
    /// Opening edge-move penalty scale (0..200).
    pub human_opening_sanity: i32,
    /// Restrict sampling to the top K candidates; 0 disables (0..10).
    pub human_topk_override: usize,
}

impl Default for PersonalityParams {
    fn default() -> Self {
        Self {
            candidate_margin_cp: 200,
            candidate_moves_max: 10,
            human_select: true,
            human_temperature: 100,
            human_noise_cp: 0,
            random_seed: 0,
            risk_appetite: 100,
            sacrifice_bias: 100,
            simplicity_bias: 100,
            trade_bias: 100,
            human_hard_floor_cp: 300,
            human_opening_sanity: 100,
            human_topk_override: 0,
        }
    }
}

impl PersonalityParams {
    pub fn clamp_ranges(&mut self) {
        self.candidate_margin_cp = self.candidate_margin_cp.clamp(0, 400);
        self.candidate_moves_max = self.candidate_moves_max.clamp(1, 30);
        self.human_temperature = self.human_temperature.clamp(0, 200);
        self.human_noise_cp = self.human_noise_cp.clamp(0, 50);
        self.random_seed = self.random_seed.min(i32::MAX as u32);
        self.risk_appetite = self.risk_appetite.clamp(0, 200);
        self.sacrifice_bias = self.sacrifice_bias.clamp(0, 200);
        self.simplicity_bias = self.simplicity_bias.clamp(0, 200);
        self.trade_bias = self.trade_bias.clamp(0, 200);
        self.human_hard_floor_cp = self.human_hard_floor_cp.clamp(0, 600);
        self.human_opening_sanity = self.human_opening_sanity.clamp(0, 200);
        self.human_topk_override = self.human_topk_override.min(10);
    }

    /// UCI option plumbing target; returns false for an unknown name.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let ok = match name {
            "CandidateMarginCp" => parse_into(&mut self.candidate_margin_cp, value),
            "CandidateMovesMax" => parse_into(&mut self.candidate_moves_max, value),
            "HumanSelect" => parse_into(&mut self.human_select, value),
            "HumanTemperature" => parse_into(&mut self.human_temperature, value),
            "HumanNoiseCp" => parse_into(&mut self.human_noise_cp, value),
            "RandomSeed" => parse_into(&mut self.random_seed, value),
            "RiskAppetite" => parse_into(&mut self.risk_appetite, value),
            "SacrificeBias" => parse_into(&mut self.sacrifice_bias, value),
            "SimplicityBias" => parse_into(&mut self.simplicity_bias, value),
            "TradeBias" => parse_into(&mut self.trade_bias, value),
            "HumanHardFloorCp" => parse_into(&mut self.human_hard_floor_cp, value),
            "HumanOpeningSanity" => parse_into(&mut self.human_opening_sanity, value),
            "HumanTopKOverride" => parse_into(&mut self.human_topk_override, value),
            _ => false,
        };
        if ok {
            self.clamp_ranges();
        }
        ok
    }

    pub fn save_to_json(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = std::fs::File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    pub fn load_from_json(path: &str) -> std::io::Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let mut params: PersonalityParams = serde_json::from_reader(reader)?;
        params.clamp_ranges();
        Ok(params)
    }
}

fn parse_into<T: std::str::FromStr>(slot: &mut T, value: &str) -> bool {
    match value.parse() {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}
