//! Shared test utilities for Autohaul.
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`fixtures`] - Builders for sensor readings and operator command scripts
//! - [`prelude`] - Convenience re-exports
//!
//! ```rust,ignore
//! use autohaul_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::unwrap_used, clippy::panic)]

pub mod fixtures;
pub mod must;
pub mod prelude;

pub use must::*;
