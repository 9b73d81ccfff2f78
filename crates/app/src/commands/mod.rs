pub mod check;
pub mod play;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Seeded when `--seed` is given, otherwise from the OS.
pub fn rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}
