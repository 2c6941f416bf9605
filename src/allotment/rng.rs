use rand::{rngs::StdRng, SeedableRng};

/// Random source for the remainder shuffle. A fixed seed makes a run
/// reproducible for audits; otherwise it is seeded from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
