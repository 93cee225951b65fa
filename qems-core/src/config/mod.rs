//! Configuration types
//!
//! Board-agnostic configuration structures; parsing lives in the firmware.

pub mod types;

pub use types::*;
