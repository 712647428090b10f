//! Production roll source.

use arena_core::RollSource;
use rand::Rng;

/// Uniform rolls from the thread-local generator. Not reproducible.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRollSource;

impl RollSource for ThreadRollSource {
    fn roll(&self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}
