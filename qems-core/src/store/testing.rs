//! Store test fixtures
//!
//! Host-only helpers, also exported to downstream crates through the
//! `testing` feature.

use std::string::{String, ToString};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Barrier, Mutex};
use std::vec::Vec;

use crate::record::{Record, Timestamp};
use crate::traits::{fill_line, Clock, LineBuffer, LineReader, LineSource, SourceError};

/// Settable clock
pub struct TestClock(AtomicI64);

impl TestClock {
    pub fn new(now: Timestamp) -> Self {
        Self(AtomicI64::new(now.as_secs()))
    }

    pub fn set(&self, now: Timestamp) {
        self.0.store(now.as_secs(), Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.0.load(Ordering::SeqCst))
    }
}

struct TestFile {
    id: String,
    text: String,
    fail_after: Option<usize>,
}

/// In-memory file system
#[derive(Default)]
pub struct TestFs {
    files: Mutex<Vec<TestFile>>,
    opened: AtomicUsize,
}

impl TestFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file
    pub fn put(&self, id: &str, text: String) {
        let mut files = self.files.lock().unwrap();
        files.retain(|file| file.id != id);
        files.push(TestFile {
            id: id.to_string(),
            text,
            fail_after: None,
        });
    }

    pub fn remove(&self, id: &str) {
        self.files.lock().unwrap().retain(|file| file.id != id);
    }

    /// Make reads of `id` fail after `lines` lines
    pub fn fail_after(&self, id: &str, lines: usize) {
        let mut files = self.files.lock().unwrap();
        if let Some(file) = files.iter_mut().find(|file| file.id == id) {
            file.fail_after = Some(lines);
        }
    }

    /// Number of successful opens
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

/// Reader over a snapshot of a file
pub struct TestReader {
    lines: Vec<String>,
    next: usize,
    fail_after: Option<usize>,
}

impl LineReader for TestReader {
    fn read_line(&mut self, buf: &mut LineBuffer) -> Result<bool, SourceError> {
        if self.fail_after == Some(self.next) {
            return Err(SourceError::Io);
        }
        match self.lines.get(self.next) {
            Some(line) => {
                fill_line(buf, line);
                self.next += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl LineSource for TestFs {
    type Reader<'a> = TestReader;

    fn exists(&self, id: &str) -> bool {
        self.files.lock().unwrap().iter().any(|file| file.id == id)
    }

    fn open(&self, id: &str) -> Result<TestReader, SourceError> {
        let files = self.files.lock().unwrap();
        let file = files
            .iter()
            .find(|file| file.id == id)
            .ok_or(SourceError::NotFound)?;
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(TestReader {
            lines: file.text.lines().map(ToString::to_string).collect(),
            next: 0,
            fail_after: file.fail_after,
        })
    }
}

/// File system whose next opened reader stops before its first line
///
/// The loader thread meets the test at `entered`, then waits at `release`.
pub struct GatedFs {
    pub fs: TestFs,
    armed: AtomicBool,
    entered: Barrier,
    release: Barrier,
}

impl GatedFs {
    pub fn new(fs: TestFs) -> Self {
        Self {
            fs,
            armed: AtomicBool::new(false),
            entered: Barrier::new(2),
            release: Barrier::new(2),
        }
    }

    /// Gate the next opened reader
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Block until the gated loader is inside its read
    pub fn wait_entered(&self) {
        self.entered.wait();
    }

    /// Let the gated loader continue
    pub fn release(&self) {
        self.release.wait();
    }
}

pub struct GatedReader<'a> {
    inner: TestReader,
    gate: Option<&'a GatedFs>,
}

impl LineReader for GatedReader<'_> {
    fn read_line(&mut self, buf: &mut LineBuffer) -> Result<bool, SourceError> {
        if let Some(gate) = self.gate.take() {
            gate.entered.wait();
            gate.release.wait();
        }
        self.inner.read_line(buf)
    }
}

impl LineSource for GatedFs {
    type Reader<'a> = GatedReader<'a>;

    fn exists(&self, id: &str) -> bool {
        self.fs.exists(id)
    }

    fn open(&self, id: &str) -> Result<GatedReader<'_>, SourceError> {
        let inner = self.fs.open(id)?;
        let gate = self.armed.swap(false, Ordering::SeqCst).then_some(self);
        Ok(GatedReader { inner, gate })
    }
}

/// Schedule file text from records
pub fn lines(records: &[(Timestamp, i32)]) -> String {
    let mut text = String::new();
    for &(timestamp, value) in records {
        text.push_str(&line(Record::new(timestamp, value)));
        text.push('\n');
    }
    text
}

/// `count` evenly spaced records starting at `start`, values from `value(i)`
pub fn schedule(
    start: Timestamp,
    step_s: i64,
    count: usize,
    value: impl Fn(usize) -> i32,
) -> String {
    let records: Vec<(Timestamp, i32)> = (0..count)
        .map(|i| (start.add_secs(step_s * i as i64), value(i)))
        .collect();
    lines(&records)
}

/// One schedule line, value as `W,CC` (non-negative values)
fn line(record: Record) -> String {
    std::format!(
        "{} {};{},{:02}",
        record.timestamp.date_label(),
        record.timestamp.time_label(),
        record.value / 100,
        record.value % 100
    )
}
