//! Loader task
//!
//! Keeps both schedule windows loaded. Loads run on this task so the render
//! task never waits on the file system.

use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};

use qems_core::config::ScheduleConfig;
use qems_core::metric::{Metric, PerMetric};
use qems_core::scheduler::{plan_reload, ReloadPlan};
use qems_core::state::Event;
use qems_core::store::StoreLoader;
use qems_core::traits::{Clock, LineSource};

use crate::channels::Channels;

/// Loader task state
pub struct LoaderTask<'a, C, S, const N: usize> {
    stores: PerMetric<StoreLoader<'a, C, S, N>>,
    channels: &'a Channels,
}

impl<'a, C: Clock, S: LineSource, const N: usize> LoaderTask<'a, C, S, N> {
    pub fn new(stores: PerMetric<StoreLoader<'a, C, S, N>>, channels: &'a Channels) -> Self {
        Self { stores, channels }
    }

    /// Run one loader period
    ///
    /// Reports the plan to the render task as a screen event. On
    /// [`ReloadPlan::Reload`] both schedules are loaded, CO2 first, with the
    /// loading screen's info text naming the one in progress.
    pub fn poll(&self) -> ReloadPlan {
        self.apply(plan_reload(
            self.stores.co2.status(),
            self.stores.cost.status(),
        ))
    }

    /// Reload both schedules even if their windows are ready
    ///
    /// Used when an upload could not reload its store itself. A missing
    /// schedule still means waiting for the next upload.
    pub fn force_reload(&self) -> ReloadPlan {
        match plan_reload(self.stores.co2.status(), self.stores.cost.status()) {
            ReloadPlan::AwaitUpload => self.apply(ReloadPlan::AwaitUpload),
            ReloadPlan::Reload | ReloadPlan::Idle => self.apply(ReloadPlan::Reload),
        }
    }

    fn apply(&self, plan: ReloadPlan) -> ReloadPlan {
        if let Some(event) = plan.event() {
            self.channels.notify(event);
        }

        match plan {
            ReloadPlan::AwaitUpload => {
                debug!("Schedule missing, waiting for upload");
            }
            ReloadPlan::Reload => {
                for (metric, store) in self.stores.iter() {
                    self.channels.set_info(metric.loading_text());
                    let outcome = store.load();
                    debug!("{} load: {:?}", metric.label(), outcome);
                }
                self.channels.notify(Event::LoadFinished);
            }
            ReloadPlan::Idle => {}
        }

        plan
    }

    /// Store handle of a metric
    pub fn store(&self, metric: Metric) -> StoreLoader<'a, C, S, N> {
        *self.stores.get(metric)
    }

    /// Loader task main loop
    pub async fn run(self, config: ScheduleConfig) {
        info!("Loader task started");

        let interval = Duration::from_millis(u64::from(config.reload_interval_ms));
        let settle = Duration::from_millis(u64::from(config.settle_ms));

        let mut requested = false;
        loop {
            let plan = if requested {
                self.force_reload()
            } else {
                self.poll()
            };
            if plan == ReloadPlan::Reload {
                Timer::after(settle).await;
            }

            // Next period, or earlier if an upload asks for it
            requested = matches!(
                select(Timer::after(interval), self.channels.reload.wait()).await,
                Either::Second(())
            );
            if requested {
                debug!("Reload requested");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{schedule, TestClock, TestFs};
    use qems_core::store::StoreState;
    use qems_core::{TimeWindowedStore, Timestamp};
    use std::vec::Vec;

    fn now() -> Timestamp {
        Timestamp::from_ymd_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn events(channels: &Channels) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = channels.screen_events.try_receive() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_missing_schedule_awaits_upload() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put("/co2.csv", schedule(now().add_secs(60), 4, 10));
        let channels = Channels::new();

        let co2: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/co2.csv");
        let cost: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/costs.csv");
        let task = LoaderTask::new(PerMetric::new(co2.loader(), cost.loader()), &channels);

        assert_eq!(task.poll(), ReloadPlan::AwaitUpload);
        assert_eq!(events(&channels), [Event::SourcesMissing]);
        // Nothing is loaded while a file is missing
        assert_eq!(co2.state(), StoreState::Unloaded);
    }

    #[test]
    fn test_reload_loads_both() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put("/co2.csv", schedule(now().add_secs(60), 4, 10));
        fs.put("/costs.csv", schedule(now().add_secs(60), 4, 20));
        let channels = Channels::new();

        let co2: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/co2.csv");
        let cost: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/costs.csv");
        let task = LoaderTask::new(PerMetric::new(co2.loader(), cost.loader()), &channels);

        assert_eq!(task.poll(), ReloadPlan::Reload);
        assert!(co2.is_ready());
        assert!(cost.is_ready());
        assert_eq!(events(&channels), [Event::LoadStarted, Event::LoadFinished]);
        // Last info text names the cost schedule
        assert_eq!(
            channels.info.try_take().as_deref(),
            Some(Metric::Cost.loading_text())
        );

        assert_eq!(task.poll(), ReloadPlan::Idle);
        assert!(events(&channels).is_empty());
    }

    #[test]
    fn test_short_schedule_falls_back_to_upload() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put("/co2.csv", schedule(now().add_secs(60), 2, 10));
        fs.put("/costs.csv", schedule(now().add_secs(60), 4, 20));
        let channels = Channels::new();

        let co2: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/co2.csv");
        let cost: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/costs.csv");
        let task = LoaderTask::new(PerMetric::new(co2.loader(), cost.loader()), &channels);

        assert_eq!(task.poll(), ReloadPlan::Reload);
        assert_eq!(task.store(Metric::Co2).state(), StoreState::Unavailable);
        assert_eq!(task.poll(), ReloadPlan::AwaitUpload);
    }

    #[test]
    fn test_forced_reload_picks_up_new_schedule() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put("/co2.csv", schedule(now().add_secs(60), 4, 10));
        fs.put("/costs.csv", schedule(now().add_secs(60), 4, 20));
        let channels = Channels::new();

        let co2: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/co2.csv");
        let cost: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/costs.csv");
        let task = LoaderTask::new(PerMetric::new(co2.loader(), cost.loader()), &channels);
        assert_eq!(task.poll(), ReloadPlan::Reload);
        let _ = events(&channels);

        // Upload replaced the file while its store was busy
        fs.put("/co2.csv", schedule(now().add_secs(60), 4, 75));
        assert_eq!(task.poll(), ReloadPlan::Idle);
        assert_eq!(co2.active_value(), 10);

        assert_eq!(task.force_reload(), ReloadPlan::Reload);
        assert_eq!(co2.active_value(), 75);
        assert_eq!(events(&channels), [Event::LoadStarted, Event::LoadFinished]);
    }

    #[test]
    fn test_forced_reload_still_awaits_upload() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put("/co2.csv", schedule(now().add_secs(60), 4, 10));
        let channels = Channels::new();

        let co2: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/co2.csv");
        let cost: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, "/costs.csv");
        let task = LoaderTask::new(PerMetric::new(co2.loader(), cost.loader()), &channels);

        assert_eq!(task.force_reload(), ReloadPlan::AwaitUpload);
        assert_eq!(co2.state(), StoreState::Unloaded);
    }
}
