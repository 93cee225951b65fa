//! Meter change tracking for the render task

use crate::metric::{Metric, PerMetric};

/// A meter has to move from one value to another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeterChange {
    pub metric: Metric,
    pub from: i32,
    pub to: i32,
}

/// Last displayed value per metric
///
/// Meters start at 0, the position of a freshly drawn meter.
#[derive(Debug, Clone, Default)]
pub struct MeterTracker {
    shown: PerMetric<i32>,
}

impl MeterTracker {
    pub const fn new() -> Self {
        Self {
            shown: PerMetric::new(0, 0),
        }
    }

    /// Value currently shown for `metric`
    pub fn shown(&self, metric: Metric) -> i32 {
        *self.shown.get(metric)
    }

    /// Record the latest value, returning the change to animate if any
    pub fn update(&mut self, metric: Metric, value: i32) -> Option<MeterChange> {
        let shown = self.shown.get_mut(metric);
        if *shown == value {
            return None;
        }
        let change = MeterChange {
            metric,
            from: *shown,
            to: value,
        };
        *shown = value;
        Some(change)
    }
}
