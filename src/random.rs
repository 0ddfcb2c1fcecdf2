//! Thread-local random source.
//!
//! Each worker thread gets its own [`SmallRng`], seeded from a single global RNG so
//! that a fixed call to [`set_seed`] makes a whole run reproducible (property R1):
//! the driving thread does all of its variation and selection work sequentially, so
//! seeding it once is enough to make `evolve_generation` deterministic build-over-build.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};
use std::cell::RefCell;
use std::ops::Range;
use std::sync::{Arc, Mutex, OnceLock};

fn global_rng() -> &'static Arc<Mutex<SmallRng>> {
    static GLOBAL_RNG: OnceLock<Arc<Mutex<SmallRng>>> = OnceLock::new();
    GLOBAL_RNG.get_or_init(|| Arc::new(Mutex::new(SmallRng::from_os_rng())))
}

thread_local! {
    static TLS_RNG: RefCell<SmallRng> = RefCell::new({
        let mut global = global_rng().lock().unwrap();
        SmallRng::seed_from_u64(global.next_u64())
    });
}

/// Seeds the global RNG. Only affects threads that have not yet pulled their
/// thread-local RNG; call this before constructing a [`crate::Population`].
pub fn set_seed(seed: u64) {
    let mut global = global_rng().lock().unwrap();
    *global = SmallRng::seed_from_u64(seed);
    TLS_RNG.with(|cell| *cell.borrow_mut() = SmallRng::seed_from_u64(global.next_u64()));
}

#[inline]
pub fn bool(prob: f32) -> bool {
    TLS_RNG.with(|cell| cell.borrow_mut().random_bool(prob as f64))
}

#[inline]
pub fn range<T>(range: Range<T>) -> T
where
    T: rand::distr::uniform::SampleUniform + PartialOrd,
{
    TLS_RNG.with(|cell| cell.borrow_mut().random_range(range))
}

#[inline]
pub fn index(len: usize) -> usize {
    range(0..len)
}

pub fn choose<T>(items: &[T]) -> &T {
    let idx = index(items.len());
    &items[idx]
}

pub fn shuffle<T>(items: &mut [T]) {
    TLS_RNG.with(|cell| items.shuffle(&mut *cell.borrow_mut()));
}
