//! Meter display trait
//!
//! The touch display runs a generated LVGL screen set (loading, WiFi setup,
//! upload hint, data). The core only drives it through this trait.

use crate::metric::Metric;
use crate::state::Screen;

/// Errors that can occur while driving the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Display not initialized yet
    NotInitialized,
    /// Screen object missing from the generated UI
    MissingObject,
    /// Text did not fit the label buffer
    BufferOverflow,
}

/// Trait for the dashboard display
pub trait MeterDisplay {
    /// Load a screen
    fn show_screen(&mut self, screen: Screen) -> Result<(), DisplayError>;

    /// Screen currently loaded
    fn current_screen(&self) -> Screen;

    /// Set the status text on the loading screen
    fn set_info(&mut self, text: &str) -> Result<(), DisplayError>;

    /// Set the clock labels on the data screen
    ///
    /// - `time`: `HH:MM:SS`
    /// - `date`: `DD.MM.YYYY`
    fn set_clock(&mut self, time: &str, date: &str) -> Result<(), DisplayError>;

    /// Animate a meter needle from `from` to `to` and update its percent label
    fn set_meter(&mut self, metric: Metric, from: i32, to: i32) -> Result<(), DisplayError>;
}
