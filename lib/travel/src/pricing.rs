//! Synthetic prices for records that carry none.
//!
//! Hotel nightly rates and flight cabin prices are absent from the seed
//! data; each ingestion draws them uniformly from `[100, 1000]`.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PRICE_MIN: u32 = 100;
pub const PRICE_MAX: u32 = 1000;

pub trait PriceSource: Send + Sync {
    fn room_price(&self) -> f64;

    fn cabin_price(&self) -> f64;
}

/// Uniform integer prices, cast to float
pub struct RandomPrices {
    rng: Mutex<StdRng>,
}

impl RandomPrices {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Reproducible sequence, for tests and benchmarks
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn draw(&self) -> f64 {
        f64::from(self.rng.lock().random_range(PRICE_MIN..=PRICE_MAX))
    }
}

impl Default for RandomPrices {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceSource for RandomPrices {
    fn room_price(&self) -> f64 {
        self.draw()
    }

    fn cabin_price(&self) -> f64 {
        self.draw()
    }
}

/// Always the same prices
#[derive(Debug, Clone, Copy)]
pub struct FixedPrices {
    pub room: f64,
    pub cabin: f64,
}

impl FixedPrices {
    pub fn new(price: f64) -> Self {
        Self {
            room: price,
            cabin: price,
        }
    }
}

impl PriceSource for FixedPrices {
    fn room_price(&self) -> f64 {
        self.room
    }

    fn cabin_price(&self) -> f64 {
        self.cabin
    }
}
