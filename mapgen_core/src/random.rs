use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Single uniform stream threaded through every generation stage.
///
/// Every stage draws from the same source in a fixed traversal order, so the
/// order of calls is part of the output contract.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Seeded ChaCha stream used by the app, the CLI, and tests.
#[derive(Debug, Clone)]
pub struct MapRng(ChaCha8Rng);

impl MapRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for MapRng {
    fn next_unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Index in `0..len` from one draw. `len` must be non-zero.
pub(crate) fn pick_index(rng: &mut dyn RandomSource, len: usize) -> usize {
    let pick = (rng.next_unit() * len as f64).floor() as usize;
    pick.min(len - 1)
}
