//! Convenience re-exports for tests.

pub use crate::fixtures::{ReadingBuilder, temperature_profile};
pub use crate::must::{must, must_some, must_within};
