//! Adapters for the outside world: time and randomness.

pub mod clock;
pub mod rolls;

pub use clock::{Clock, ManualClock, SystemClock};
pub use rolls::ThreadRollSource;
