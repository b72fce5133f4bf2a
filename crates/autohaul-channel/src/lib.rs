//! Fixed-capacity latest-value sensor channel.
//!
//! The channel decouples the external sensor producer from the control loops.
//! Writers never block: when the ring is full the oldest reading is dropped
//! ("freshest data wins"). Control loops call
//! [`SharedSensorChannel::peek_latest`] each cycle; archival consumers that must
//! not skip data drain it with [`SharedSensorChannel::read`].
//!
//! ```rust
//! use autohaul_channel::SharedSensorChannel;
//! use autohaul_types::SensorReading;
//!
//! let channel = SharedSensorChannel::with_capacity(2);
//! for t in 0..3 {
//!     channel.write(SensorReading { timestamp_ms: t, ..Default::default() });
//! }
//! assert!(channel.is_full());
//! assert_eq!(channel.peek_latest().timestamp_ms, 2);
//! assert_eq!(channel.read().timestamp_ms, 1);
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    missing_docs,
    missing_debug_implementations
)]

pub mod channel;

pub mod prelude;

pub use channel::{DEFAULT_CAPACITY, OVERWRITE_WARN_INTERVAL, SharedSensorChannel};
