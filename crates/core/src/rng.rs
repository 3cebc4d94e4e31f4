use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Decimal strings are taken as the seed itself; anything else is hashed.
    pub fn from_seed_str(seed: &str) -> Self {
        Self::from_seed(seed_from_str(seed))
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream for the `stream`-th unit of work under this seed.
    pub fn fork(&self, stream: u64) -> Self {
        Self::from_seed(mix(self.seed ^ mix(stream.wrapping_add(1))))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Uniform in `[0, upper)`. Callers guarantee `upper > 0`.
    pub fn next_f64(&mut self, upper: f64) -> f64 {
        self.rng.gen::<f64>() * upper
    }

    pub fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

pub fn seed_from_str(seed: &str) -> u64 {
    let trimmed = seed.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return value;
    }
    trimmed.bytes().fold(FNV_OFFSET, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
    })
}

pub fn random_seed() -> u64 {
    rand::random()
}

// splitmix64 finaliser
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
