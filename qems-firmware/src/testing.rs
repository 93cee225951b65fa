//! Host fixtures for task tests

use std::string::{String, ToString};
use std::vec::Vec;

use qems_core::metric::Metric;
use qems_core::state::Screen;
use qems_core::traits::{DisplayError, MeterDisplay};
use qems_core::Timestamp;

pub use qems_core::store::testing::{GatedFs, TestClock, TestFs};

/// `count` one-minute records from `start`, all with `value` hundredths
pub fn schedule(start: Timestamp, count: usize, value: i32) -> String {
    qems_core::store::testing::schedule(start, 60, count, |_| value)
}

/// Display calls, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Screen(Screen),
    Info(String),
    Clock(String, String),
    Meter(Metric, i32, i32),
}

/// Display that records every call
#[derive(Default)]
pub struct MockDisplay {
    pub screen: Screen,
    pub calls: Vec<Call>,
    /// Fail every call
    pub fail: bool,
    /// Fail only clock label updates
    pub fail_clock: bool,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn meters(&self) -> Vec<(Metric, i32, i32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Meter(metric, from, to) => Some((*metric, *from, *to)),
                _ => None,
            })
            .collect()
    }

    fn check(&self) -> Result<(), DisplayError> {
        if self.fail {
            Err(DisplayError::NotInitialized)
        } else {
            Ok(())
        }
    }
}

impl MeterDisplay for MockDisplay {
    fn show_screen(&mut self, screen: Screen) -> Result<(), DisplayError> {
        self.check()?;
        self.screen = screen;
        self.calls.push(Call::Screen(screen));
        Ok(())
    }

    fn current_screen(&self) -> Screen {
        self.screen
    }

    fn set_info(&mut self, text: &str) -> Result<(), DisplayError> {
        self.check()?;
        self.calls.push(Call::Info(text.to_string()));
        Ok(())
    }

    fn set_clock(&mut self, time: &str, date: &str) -> Result<(), DisplayError> {
        self.check()?;
        if self.fail_clock {
            return Err(DisplayError::NotInitialized);
        }
        self.calls
            .push(Call::Clock(time.to_string(), date.to_string()));
        Ok(())
    }

    fn set_meter(&mut self, metric: Metric, from: i32, to: i32) -> Result<(), DisplayError> {
        self.check()?;
        self.calls.push(Call::Meter(metric, from, to));
        Ok(())
    }
}
