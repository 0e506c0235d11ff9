use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PALETTE: [&str; 10] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
    "#BB8FCE", "#85C1E9",
];

/// Picks participant colours. Two participants may end up with the same one.
#[derive(Debug, Clone)]
pub struct ColorPicker {
    rng: StdRng,
}

impl ColorPicker {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn pick(&mut self) -> &'static str {
        PALETTE[self.rng.gen_range(0..PALETTE.len())]
    }
}
