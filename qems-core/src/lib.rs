//! Board-agnostic core logic for the QEMS energy saving display
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Schedule records and the CSV line format
//! - Collaborator traits (clock, line source, meter display)
//! - The time-windowed record store shared by the loader and render tasks
//! - Screen state machine
//! - Reload planning and meter change tracking
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(any(test, feature = "testing"))]
extern crate std;

#[macro_use]
mod fmt;

pub mod config;
pub mod metric;
pub mod record;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod traits;

pub use metric::{Metric, PerMetric};
pub use record::{Record, Timestamp};
pub use store::{LoadOutcome, LoadStats, LookupMode, StoreState, TimeWindowedStore};
