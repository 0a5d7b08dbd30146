use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::cell::RefCell;

thread_local! {
    static RNG: RefCell<ChaCha20Rng> = RefCell::new(ChaCha20Rng::from_seed(OsRng.gen()));
}

/// A ChaCha20 CSPRNG seeded from the OS, one instance per thread.
pub struct SecureRng;

impl SecureRng {
    pub fn fill_bytes(dest: &mut [u8]) {
        RNG.with(|rng| rng.borrow_mut().fill_bytes(dest))
    }
}
