//! Time-windowed record store
//!
//! Holds the next `N` future-dated records of one schedule file and answers
//! "which value applies right now". The loader task (re)fills the window
//! from the file while the render task keeps looking values up; the two
//! never block each other:
//!
//! - the load latch in the status word admits one load at a time, further
//!   requests are dropped
//! - a load builds the new window off to the side and publishes it with a
//!   single generation bump
//! - lookups read either the previous or the new window, never a mix

mod handle;
mod status;
mod window;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{source_id as make_source_id, MetricConfig, SourceId};
use crate::record::{parse_line, Record};
use crate::traits::{Clock, LineBuffer, LineReader, LineSource};

pub use handle::{StoreLoader, StoreReader};
pub use status::{Status, StoreState};

use status::StatusWord;
use window::WindowBuffer;

/// Records kept per schedule
pub const RECORD_CAPACITY: usize = 120;

/// Lookup result when no buffered record lies in the future
pub const NO_ACTIVE_VALUE: i32 = 0;

/// Which buffered records a lookup may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LookupMode {
    /// Never return the record at window position 0
    ///
    /// Deployed schedule files are authored against this behaviour: the
    /// value shown is the one of the *second* upcoming slot.
    #[default]
    SkipFirst,
    /// Return the first record after now
    FirstFuture,
}

impl LookupMode {
    const fn skipped(self) -> usize {
        match self {
            LookupMode::SkipFirst => 1,
            LookupMode::FirstFuture => 0,
        }
    }
}

/// Line counters of one load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoadStats {
    /// Lines read from the source
    pub lines: u32,
    /// Lines without a valid timestamp
    pub malformed: u32,
    /// Lines dated at or before the load's anchor time
    pub past: u32,
    /// Records kept in the window
    pub stored: u32,
}

/// What a call to [`TimeWindowedStore::load_from_source`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// Another load holds the latch; nothing changed
    Busy,
    /// Source could not be opened
    SourceUnavailable,
    /// Fewer than `N` future records; window not replaced
    InsufficientData(LoadStats),
    /// New window published
    Loaded(LoadStats),
}

impl LoadOutcome {
    /// A new window was published
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    /// Line counters, if the source was read
    pub fn stats(&self) -> Option<LoadStats> {
        match self {
            LoadOutcome::InsufficientData(stats) | LoadOutcome::Loaded(stats) => Some(*stats),
            LoadOutcome::Busy | LoadOutcome::SourceUnavailable => None,
        }
    }
}

/// Window of upcoming records for one schedule file
///
/// `N` is the window capacity; a load only becomes ready when it finds at
/// least `N` future records. All methods take `&self` and may be called
/// from any task.
pub struct TimeWindowedStore<C, S, const N: usize = RECORD_CAPACITY> {
    clock: C,
    source: S,
    source_id: Option<SourceId>,
    lookup: LookupMode,
    status: StatusWord,
    window: WindowBuffer<N>,
}

impl<C: Clock, S: LineSource, const N: usize> TimeWindowedStore<C, S, N> {
    /// Create a store bound to a schedule file
    ///
    /// Only probes whether the file exists; nothing is loaded. A path
    /// longer than a [`SourceId`] is rejected: the store then never opens
    /// anything and stays unavailable.
    pub fn new(clock: C, source: S, source_id: &str) -> Self {
        let source_id = make_source_id(source_id);
        let available = match &source_id {
            Some(id) => {
                let present = source.exists(id);
                if !present {
                    info!("Schedule [{}] not found", id.as_str());
                }
                present
            }
            None => {
                warn!("Schedule path too long, store disabled");
                false
            }
        };

        Self {
            clock,
            source,
            source_id,
            lookup: LookupMode::default(),
            status: StatusWord::new(available),
            window: WindowBuffer::new(),
        }
    }

    /// Create a store from a metric config
    pub fn from_config(clock: C, source: S, config: &MetricConfig) -> Self {
        Self::new(clock, source, &config.source).with_lookup(config.lookup)
    }

    /// Set the lookup mode
    pub fn with_lookup(mut self, lookup: LookupMode) -> Self {
        self.lookup = lookup;
        self
    }

    /// Identifier of the schedule file
    ///
    /// Empty if the path given at construction was rejected.
    pub fn source_id(&self) -> &str {
        self.source_id.as_deref().unwrap_or("")
    }

    /// Configured lookup mode
    pub fn lookup_mode(&self) -> LookupMode {
        self.lookup
    }

    /// Snapshot of the status word
    pub fn status(&self) -> Status {
        self.status.load()
    }

    /// Lifecycle state
    pub fn state(&self) -> StoreState {
        self.status().state()
    }

    /// Window is full and the source was readable
    pub fn is_ready(&self) -> bool {
        let status = self.status();
        status.is_ready() && status.is_source_available()
    }

    /// Source could be opened at the last attempt
    pub fn is_source_available(&self) -> bool {
        self.status().is_source_available()
    }

    /// A load is running
    pub fn is_loading(&self) -> bool {
        self.status().is_loading()
    }

    /// Value of the first qualifying record after now
    ///
    /// Scans the published window in stored order, honouring the lookup
    /// mode. If nothing qualifies the store is flagged for reload and
    /// `None` is returned.
    pub fn try_active_value(&self) -> Option<i32> {
        let now = self.clock.now();
        let status = self.status();
        let skipped = self.lookup.skipped();

        let found = self.window.read(status.generation(), |records| {
            records
                .skip(skipped)
                .find(|record| record.timestamp > now)
                .map(|record| record.value)
        });

        if found.is_none() {
            warn!("No data available for [{}]", self.source_id());
            if self.status.invalidate(status.generation()) {
                debug!("[{}] flagged for reload", self.source_id());
            }
        }

        found
    }

    /// Value that applies right now, [`NO_ACTIVE_VALUE`] if none
    pub fn active_value(&self) -> i32 {
        self.try_active_value().unwrap_or(NO_ACTIVE_VALUE)
    }

    /// Copy of the published window
    pub fn records(&self) -> Vec<Record, N> {
        let generation = self.status().generation();
        self.window
            .read(generation, |records| records.collect::<Vec<Record, N>>())
    }

    /// (Re)load the window from the schedule file
    ///
    /// Returns immediately with [`LoadOutcome::Busy`] if a load is already
    /// running. Otherwise keeps the first `N` records dated after the time
    /// captured at the start of the load, reading the file to the end.
    /// Only a full window is published; a short one leaves the previous
    /// window visible and marks the source unavailable.
    pub fn load_from_source(&self) -> LoadOutcome {
        let Some(status) = self.status.begin_load() else {
            debug!("Load of [{}] already in progress", self.source_id());
            return LoadOutcome::Busy;
        };

        let Some(id) = self.source_id.as_deref() else {
            self.status.abort_load();
            return LoadOutcome::SourceUnavailable;
        };

        let anchor = self.clock.now();

        let mut reader = match self.source.open(id) {
            Ok(reader) => reader,
            Err(e) => {
                warn!(
                    "Could not open [{}]: {:?}, skip processing",
                    self.source_id(),
                    e
                );
                self.status.abort_load();
                return LoadOutcome::SourceUnavailable;
            }
        };

        self.status.mark_available();
        info!("Opened [{}], process data...", self.source_id());

        let mut window: Vec<Record, N> = Vec::new();
        let mut stats = LoadStats::default();
        let mut line = LineBuffer::new();

        loop {
            match reader.read_line(&mut line) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("Read of [{}] failed: {:?}", self.source_id(), e);
                    break;
                }
            }
            stats.lines = stats.lines.saturating_add(1);

            match parse_line(&line) {
                Ok(record) if record.timestamp > anchor => {
                    // Past capacity the rest of the file is only drained
                    if window.push(record).is_ok() {
                        stats.stored += 1;
                    }
                }
                Ok(_) => stats.past = stats.past.saturating_add(1),
                Err(_) => stats.malformed = stats.malformed.saturating_add(1),
            }
        }
        drop(reader);

        info!(
            "Updated data records for [{}], loaded records = {}",
            self.source_id(),
            stats.stored
        );

        if window.is_full() {
            self.window
                .write(status.generation().wrapping_add(1), &window);
            self.status.publish();
            LoadOutcome::Loaded(stats)
        } else {
            warn!(
                "[{}] has {} future records, {} required",
                self.source_id(),
                stats.stored,
                N
            );
            self.status.abort_load();
            LoadOutcome::InsufficientData(stats)
        }
    }

    /// Handle for the loader side (loader task, upload handler)
    pub fn loader(&self) -> StoreLoader<'_, C, S, N> {
        StoreLoader::new(self)
    }

    /// Handle for the lookup side (render task)
    pub fn reader(&self) -> StoreReader<'_, C, S, N> {
        StoreReader::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{self, schedule, GatedFs, TestClock, TestFs};
    use super::*;
    use crate::config::MAX_SOURCE_ID_LEN;
    use crate::record::Timestamp;
    use std::string::String;
    use std::thread;
    use std::vec::Vec as StdVec;

    const CO2: &str = "/co2.csv";

    fn now() -> Timestamp {
        Timestamp::from_ymd_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    fn tomorrow() -> Timestamp {
        Timestamp::from_ymd_hms(2026, 10, 19, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_construct_probes_source() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, String::new());

        let present: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, CO2);
        assert!(present.is_source_available());
        assert!(!present.is_ready());
        assert_eq!(present.state(), StoreState::Unloaded);
        assert_eq!(present.source_id(), CO2);

        let missing: TimeWindowedStore<_, _, 4> =
            TimeWindowedStore::new(&clock, &fs, "/costs.csv");
        assert!(!missing.is_source_available());
        assert_eq!(missing.state(), StoreState::Unavailable);
    }

    #[test]
    fn test_full_day_schedule() {
        // 130 minutes of data starting tomorrow, value = line index
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 130, |i| i as i32));

        let store: TimeWindowedStore<_, _> = TimeWindowedStore::new(&clock, &fs, CO2);
        let outcome = store.load_from_source();

        assert!(outcome.is_loaded());
        assert!(store.is_ready());
        assert_eq!(store.state(), StoreState::Ready);
        // Index 0 is never returned
        assert_eq!(store.active_value(), 1);

        let records = store.records();
        assert_eq!(records.len(), RECORD_CAPACITY);
        assert_eq!(records[0].timestamp, tomorrow());
        assert_eq!(records[RECORD_CAPACITY - 1].value, 119);

        // The rest of the file is still drained
        let stats = outcome.stats().unwrap();
        assert_eq!(stats.lines, 130);
        assert_eq!(stats.stored, 120);
    }

    #[test]
    fn test_missing_source() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();

        let store: TimeWindowedStore<_, _> = TimeWindowedStore::new(&clock, &fs, CO2);
        assert!(!store.is_source_available());

        assert_eq!(store.load_from_source(), LoadOutcome::SourceUnavailable);
        assert!(!store.is_ready());
        assert!(!store.is_loading());
    }

    #[test]
    fn test_oversized_path_is_rejected() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        let long = "/schedules/archive/2026/october/co2.csv";
        // A file at the truncated path must not be picked up instead
        fs.put(&long[..MAX_SOURCE_ID_LEN], schedule(tomorrow(), 60, 4, |_| 7));
        fs.put(long, schedule(tomorrow(), 60, 4, |_| 7));

        let store: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, long);
        assert!(!store.is_source_available());
        assert_eq!(store.source_id(), "");

        assert_eq!(store.load_from_source(), LoadOutcome::SourceUnavailable);
        assert!(!store.is_loading());
        assert_eq!(fs.opened(), 0);
    }

    #[test]
    fn test_source_removed_after_load() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 4, |i| i as i32));

        let store: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, CO2);
        assert!(store.load_from_source().is_loaded());

        fs.remove(CO2);
        assert_eq!(store.load_from_source(), LoadOutcome::SourceUnavailable);
        assert_eq!(store.state(), StoreState::Unavailable);
        assert!(!store.is_ready());
    }

    #[test]
    fn test_short_schedule_is_not_ready() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 50, |_| 42));

        let store: TimeWindowedStore<_, _> = TimeWindowedStore::new(&clock, &fs, CO2);
        let outcome = store.load_from_source();

        assert!(matches!(outcome, LoadOutcome::InsufficientData(stats) if stats.stored == 50));
        assert!(!store.is_ready());
        assert!(!store.is_source_available());
        assert_eq!(store.state(), StoreState::Unavailable);
    }

    #[test]
    fn test_only_future_records_are_kept() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        // Hourly from 09:00 today: 09..12 are not after the 12:00 anchor
        let start = Timestamp::from_ymd_hms(2026, 10, 18, 9, 0, 0).unwrap();
        fs.put(CO2, schedule(start, 3600, 8, |i| i as i32));

        let store: TimeWindowedStore<_, _, 3> = TimeWindowedStore::new(&clock, &fs, CO2);
        let outcome = store.load_from_source();

        assert!(outcome.is_loaded());
        assert_eq!(outcome.stats().unwrap().past, 4);
        let records = store.records();
        assert!(records.iter().all(|record| record.timestamp > now()));
        let values: StdVec<i32> = records.iter().map(|record| record.value).collect();
        assert_eq!(values, [4, 5, 6]);
    }

    #[test]
    fn test_exhausted_window_needs_reload() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 4, |i| 10 + i as i32));

        let store: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, CO2);
        assert!(store.load_from_source().is_loaded());
        assert_eq!(store.active_value(), 11);

        // Clock moves past the whole window
        clock.set(tomorrow().add_secs(3600));
        assert_eq!(store.active_value(), NO_ACTIVE_VALUE);
        assert!(!store.is_ready());
        assert_eq!(store.state(), StoreState::NeedsReload);

        // A fresh file brings it back
        fs.put(CO2, schedule(tomorrow().add_secs(7200), 60, 4, |_| 33));
        assert!(store.load_from_source().is_loaded());
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.active_value(), 33);
    }

    #[test]
    fn test_lookup_walks_with_clock() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 6, |i| i as i32));

        let store: TimeWindowedStore<_, _, 6> = TimeWindowedStore::new(&clock, &fs, CO2);
        store.load_from_source();

        // At 00:02:30 the first record after now is index 3
        clock.set(tomorrow().add_secs(150));
        assert_eq!(store.active_value(), 3);
        // A timestamp equal to now does not qualify
        clock.set(tomorrow().add_secs(240));
        assert_eq!(store.active_value(), 5);
    }

    #[test]
    fn test_first_record_is_skipped() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        // Unsorted file: the latest slot sits at position 0
        let lines = [
            (tomorrow().add_secs(300), 50),
            (tomorrow().add_secs(60), 11),
            (tomorrow().add_secs(120), 12),
        ];
        fs.put(CO2, testing::lines(&lines));

        let store: TimeWindowedStore<_, _, 3> = TimeWindowedStore::new(&clock, &fs, CO2);
        let strict: TimeWindowedStore<_, _, 3> =
            TimeWindowedStore::new(&clock, &fs, CO2).with_lookup(LookupMode::FirstFuture);
        assert!(store.load_from_source().is_loaded());
        assert!(strict.load_from_source().is_loaded());

        clock.set(tomorrow().add_secs(200));
        // Position 0 qualifies but is never returned
        assert_eq!(store.try_active_value(), None);
        assert_eq!(strict.try_active_value(), Some(50));
    }

    #[test]
    fn test_first_future_lookup() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 4, |i| 20 + i as i32));

        let store: TimeWindowedStore<_, _, 4> =
            TimeWindowedStore::new(&clock, &fs, CO2).with_lookup(LookupMode::FirstFuture);
        store.load_from_source();
        assert_eq!(store.active_value(), 20);
    }

    #[test]
    fn test_short_reload_keeps_previous_window() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 4, |i| i as i32));

        let store: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, CO2);
        assert!(store.load_from_source().is_loaded());
        let generation = store.status().generation();

        fs.put(CO2, schedule(tomorrow(), 60, 2, |_| 99));
        assert!(matches!(
            store.load_from_source(),
            LoadOutcome::InsufficientData(_)
        ));

        assert!(!store.is_ready());
        assert_eq!(store.status().generation(), generation);
        assert_eq!(store.try_active_value(), Some(1));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        let mut text = String::from("Zeitstempel;CO2\n");
        for (i, line) in schedule(tomorrow(), 60, 5, |i| i as i32).lines().enumerate() {
            text.push_str(line);
            text.push('\n');
            if i % 2 == 0 {
                text.push_str("not a record\n");
            }
        }
        text.push('\n');
        fs.put(CO2, text);

        let store: TimeWindowedStore<_, _, 5> = TimeWindowedStore::new(&clock, &fs, CO2);
        let outcome = store.load_from_source();

        assert!(outcome.is_loaded());
        // header + 3 interleaved + trailing blank line
        assert_eq!(outcome.stats().unwrap().malformed, 5);
        assert_eq!(store.records().len(), 5);
    }

    #[test]
    fn test_read_error_ends_load() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 8, |i| i as i32));
        fs.fail_after(CO2, 3);

        let store: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, CO2);
        let outcome = store.load_from_source();

        assert!(matches!(outcome, LoadOutcome::InsufficientData(stats) if stats.lines == 3));
        assert!(!store.is_ready());
    }

    #[test]
    fn test_handles() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 4, |i| i as i32));

        let store: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &fs, CO2);
        let loader = store.loader();
        let reader = store.reader();

        assert!(loader.load().is_loaded());
        assert!(reader.is_ready());
        assert_eq!(reader.active_value(), 1);
        assert_eq!(reader.source_id(), loader.source_id());
    }

    #[test]
    fn test_from_config() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        let mut config = MetricConfig::with_source(CO2);
        config.lookup = LookupMode::FirstFuture;

        let store: TimeWindowedStore<_, _, 4> =
            TimeWindowedStore::from_config(&clock, &fs, &config);
        assert_eq!(store.source_id(), CO2);
        assert_eq!(store.lookup_mode(), LookupMode::FirstFuture);
    }

    #[test]
    fn test_load_while_loading_is_busy() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        fs.put(CO2, schedule(tomorrow(), 60, 4, |_| 11));
        let gated = GatedFs::new(fs);

        let store: TimeWindowedStore<_, _, 4> = TimeWindowedStore::new(&clock, &gated, CO2);
        assert!(store.load_from_source().is_loaded());

        gated.fs.put(CO2, schedule(tomorrow(), 60, 4, |_| 22));
        gated.arm();

        thread::scope(|s| {
            let loading = s.spawn(|| store.load_from_source());

            gated.wait_entered();
            assert!(store.is_loading());
            assert_eq!(store.load_from_source(), LoadOutcome::Busy);
            // Lookups keep reading the previous window meanwhile
            assert_eq!(store.try_active_value(), Some(11));
            gated.release();

            assert!(loading.join().unwrap().is_loaded());
        });

        // Only the two real loads opened the file
        assert_eq!(gated.fs.opened(), 2);
        assert!(!store.is_loading());
        assert_eq!(store.active_value(), 22);
    }

    #[test]
    fn test_lookups_never_see_mixed_windows() {
        let clock = TestClock::new(now());
        let fs = TestFs::new();
        let first = schedule(tomorrow(), 60, 8, |_| 11);
        let second = schedule(tomorrow(), 60, 8, |_| 22);
        fs.put(CO2, first.clone());

        let store: TimeWindowedStore<_, _, 8> = TimeWindowedStore::new(&clock, &fs, CO2);
        assert!(store.load_from_source().is_loaded());

        thread::scope(|s| {
            s.spawn(|| {
                for round in 0..200 {
                    let text = if round % 2 == 0 { &second } else { &first };
                    fs.put(CO2, text.clone());
                    assert!(store.load_from_source().is_loaded());
                }
            });

            for _ in 0..2000 {
                let value = store.active_value();
                assert!(value == 11 || value == 22, "unexpected value {}", value);

                let records = store.records();
                assert_eq!(records.len(), 8);
                assert!(records.iter().all(|record| record.value == records[0].value));
            }
        });
    }
}
