#![forbid(unsafe_code)]

use rand_pcg::Pcg64Mcg;

pub mod device;
pub mod net;
pub mod routing;

/// Random number generator shared by every stochastic model of a run.
pub type SimRng = Pcg64Mcg;

pub fn seeded_rng(seed: u64) -> SimRng {
    Pcg64Mcg::new(u128::from(seed))
}
