//! Task scheduling policy
//!
//! Decides what the loader task does on each period and which meters the
//! render task has to animate. The task loops themselves live in the
//! firmware.

pub mod meter;
pub mod reload;

pub use meter::{MeterChange, MeterTracker};
pub use reload::{plan_reload, ReloadPlan};
