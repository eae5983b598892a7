//! Wall-clock timing

pub mod clock;
pub mod timer;

pub use clock::*;
pub use timer::*;
