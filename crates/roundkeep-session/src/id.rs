//! Game code generation.
//!
//! Codes are typed by hand and read aloud between players, so the alphabet
//! leaves out glyphs that are easy to confuse: `0`/`O`, `1`/`I`/`L`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use roundkeep_protocol::GameId;

/// Characters a game code may contain (31 glyphs).
pub const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Default code length. 31^4 ≈ 920k possible codes.
pub const DEFAULT_ID_LENGTH: usize = 4;

/// Draws random game codes.
///
/// The generator does not know which codes are taken. Uniqueness is the
/// store's job: it keeps drawing until a code is free.
#[derive(Debug, Clone)]
pub struct GameIdGenerator {
    length: usize,
    rng: StdRng,
}

impl GameIdGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new(length: usize) -> Self {
        Self {
            length,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a generator with a fixed seed. Same seed, same codes.
    pub fn seeded(length: usize, seed: u64) -> Self {
        Self {
            length,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of characters per code.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Draws one code: each character picked uniformly and independently.
    pub fn generate(&mut self) -> GameId {
        let code: String = (0..self.length)
            .map(|_| {
                let idx = self.rng.random_range(0..ALPHABET.len());
                char::from(ALPHABET[idx])
            })
            .collect();
        GameId::new(code)
    }
}

impl Default for GameIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_LENGTH)
    }
}
