//! Packed store status word
//!
//! Readiness flags, the load latch and the window generation share one
//! atomic word so every transition is a single atomic update:
//!
//! ```text
//! 31                               3   2         1       0
//! ┌──────────────────────────────────┬─────────┬───────────┬───────┐
//! │ generation                       │ LOADING │ AVAILABLE │ READY │
//! └──────────────────────────────────┴─────────┴───────────┴───────┘
//! ```

use portable_atomic::{AtomicU32, Ordering};

const READY: u32 = 1 << 0;
const AVAILABLE: u32 = 1 << 1;
const LOADING: u32 = 1 << 2;
const GENERATION_SHIFT: u32 = 3;
const GENERATION_MASK: u32 = u32::MAX >> GENERATION_SHIFT;

/// Lifecycle state of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreState {
    /// Source present, no window loaded yet
    Unloaded,
    /// Full window loaded and trusted
    Ready,
    /// Window ran out of future records, reload required
    NeedsReload,
    /// Source missing, unreadable or too short
    Unavailable,
}

/// Snapshot of the status word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u32);

impl Status {
    /// Window is full and trusted
    pub const fn is_ready(self) -> bool {
        self.0 & READY != 0
    }

    /// Source could be opened at the last attempt
    pub const fn is_source_available(self) -> bool {
        self.0 & AVAILABLE != 0
    }

    /// A load holds the latch
    pub const fn is_loading(self) -> bool {
        self.0 & LOADING != 0
    }

    /// Number of windows published so far (wrapping)
    pub const fn generation(self) -> u32 {
        self.0 >> GENERATION_SHIFT
    }

    #[cfg(test)]
    pub(crate) const fn with_flags(available: bool, ready: bool) -> Self {
        let available = if available { AVAILABLE } else { 0 };
        let ready = if ready { READY } else { 0 };
        Self((1 << GENERATION_SHIFT) | available | ready)
    }

    /// Lifecycle state
    pub const fn state(self) -> StoreState {
        if !self.is_source_available() {
            StoreState::Unavailable
        } else if self.is_ready() {
            StoreState::Ready
        } else if self.generation() == 0 {
            StoreState::Unloaded
        } else {
            StoreState::NeedsReload
        }
    }
}

/// Atomic status word shared by the loader and lookups
#[derive(Debug)]
pub(crate) struct StatusWord(AtomicU32);

impl StatusWord {
    /// Fresh store, nothing loaded
    pub(crate) const fn new(available: bool) -> Self {
        Self(AtomicU32::new(if available { AVAILABLE } else { 0 }))
    }

    pub(crate) fn load(&self) -> Status {
        Status(self.0.load(Ordering::Acquire))
    }

    /// Take the load latch and clear READY
    ///
    /// Returns `None` if another load holds the latch.
    pub(crate) fn begin_load(&self) -> Option<Status> {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                (word & LOADING == 0).then_some((word | LOADING) & !READY)
            })
            .ok()
            .map(|prev| Status((prev | LOADING) & !READY))
    }

    /// Source opened during the current load
    pub(crate) fn mark_available(&self) {
        self.0.fetch_or(AVAILABLE, Ordering::AcqRel);
    }

    /// Release the latch without publishing a window
    pub(crate) fn abort_load(&self) {
        self.0
            .fetch_and(!(LOADING | AVAILABLE | READY), Ordering::AcqRel);
    }

    /// Publish the next generation as ready and release the latch
    ///
    /// The window slot of the next generation must be fully written first.
    pub(crate) fn publish(&self) -> Status {
        let prev = self
            .0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                Some(next_generation(word))
            })
            .unwrap_or_else(|word| word);
        Status(next_generation(prev))
    }

    /// Clear READY if `generation` is still the published one
    ///
    /// Returns true if this call cleared the flag.
    pub(crate) fn invalidate(&self, generation: u32) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let current = Status(word);
                (current.generation() == generation && current.is_ready())
                    .then_some(word & !READY)
            })
            .is_ok()
    }
}

fn next_generation(word: u32) -> u32 {
    let generation = ((word >> GENERATION_SHIFT).wrapping_add(1)) & GENERATION_MASK;
    (generation << GENERATION_SHIFT) | READY | AVAILABLE
}
