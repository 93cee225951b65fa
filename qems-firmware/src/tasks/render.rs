//! Render task
//!
//! Updates the clock labels every period, moves the meters when the active
//! value of a schedule changes and applies queued screen events.

use embassy_time::{Duration, Ticker};

use qems_core::config::ScheduleConfig;
use qems_core::metric::PerMetric;
use qems_core::scheduler::MeterTracker;
use qems_core::store::StoreReader;
use qems_core::traits::{Clock, DisplayError, LineSource, MeterDisplay};

use crate::channels::Channels;

/// Render task state
pub struct RenderTask<'a, C, S, K, D, const N: usize> {
    stores: PerMetric<StoreReader<'a, C, S, N>>,
    clock: K,
    display: D,
    meters: MeterTracker,
    channels: &'a Channels,
}

impl<'a, C, S, K, D, const N: usize> RenderTask<'a, C, S, K, D, N>
where
    C: Clock,
    S: LineSource,
    K: Clock,
    D: MeterDisplay,
{
    pub fn new(
        stores: PerMetric<StoreReader<'a, C, S, N>>,
        clock: K,
        display: D,
        channels: &'a Channels,
    ) -> Self {
        Self {
            stores,
            clock,
            display,
            meters: MeterTracker::new(),
            channels,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Run one render period
    ///
    /// Every step runs even if an earlier one fails; the first display
    /// error is returned.
    pub fn tick(&mut self) -> Result<(), DisplayError> {
        let now = self.clock.now();
        let clock = self
            .display
            .set_clock(&now.time_label(), &now.date_label());

        let meters = self.update_meters();

        let info = match self.channels.info.try_take() {
            Some(text) => self.display.set_info(&text),
            None => Ok(()),
        };

        let screen = self.apply_screen_events();

        clock.and(meters).and(info).and(screen)
    }

    fn update_meters(&mut self) -> Result<(), DisplayError> {
        // Meters only move while both windows are trusted
        if !(self.stores.co2.is_ready() && self.stores.cost.is_ready()) {
            return Ok(());
        }

        for (metric, store) in self.stores.iter() {
            let value = store.active_value();
            if let Some(change) = self.meters.update(metric, value) {
                info!(
                    "Change {} meter from [{}] to [{}]",
                    metric.label(),
                    change.from,
                    change.to
                );
                self.display.set_meter(metric, change.from, change.to)?;
            }
        }
        Ok(())
    }

    fn apply_screen_events(&mut self) -> Result<(), DisplayError> {
        let current = self.display.current_screen();
        let mut next = current;
        while let Ok(event) = self.channels.screen_events.try_receive() {
            next = next.transition(event);
        }
        if next != current {
            debug!("Screen {:?} -> {:?}", current, next);
            self.display.show_screen(next)?;
        }
        Ok(())
    }

    /// Render task main loop
    pub async fn run(mut self, config: ScheduleConfig) {
        info!("Render task started");

        let mut ticker =
            Ticker::every(Duration::from_millis(u64::from(config.render_interval_ms)));

        loop {
            if let Err(e) = self.tick() {
                warn!("Display update failed: {:?}", e);
            }
            ticker.next().await;
        }
    }
}
