//! Double-buffered record window
//!
//! Two slots of `N` records. Generation `g` lives in slot `g & 1`; the
//! loader only ever writes the slot of the next generation, then publishes
//! it through the status word. Each slot carries a sequence counter (odd
//! while written) so a lookup that is still scanning a slot two
//! generations old notices the rewrite and retries instead of returning a
//! value mixed from two windows. Lookups never wait on a lock.

use core::array;
use core::hint::spin_loop;

use portable_atomic::{fence, AtomicI32, AtomicI64, AtomicU32, AtomicUsize, Ordering};

use crate::record::{Record, Timestamp};

/// One window slot
struct Slot<const N: usize> {
    seq: AtomicU32,
    len: AtomicUsize,
    timestamps: [AtomicI64; N],
    values: [AtomicI32; N],
}

impl<const N: usize> Slot<N> {
    fn new() -> Self {
        Self {
            seq: AtomicU32::new(0),
            len: AtomicUsize::new(0),
            timestamps: array::from_fn(|_| AtomicI64::new(0)),
            values: array::from_fn(|_| AtomicI32::new(0)),
        }
    }

    fn write(&self, records: &[Record]) {
        let seq = self.seq.load(Ordering::Relaxed);
        self.seq.store(seq.wrapping_add(1), Ordering::Relaxed);
        fence(Ordering::Release);

        let len = records.len().min(N);
        for (i, record) in records[..len].iter().enumerate() {
            self.timestamps[i].store(record.timestamp.as_secs(), Ordering::Relaxed);
            self.values[i].store(record.value, Ordering::Relaxed);
        }
        self.len.store(len, Ordering::Relaxed);

        self.seq.store(seq.wrapping_add(2), Ordering::Release);
    }

    fn read<T>(&self, mut scan: impl FnMut(SlotRecords<'_, N>) -> T) -> T {
        loop {
            let before = self.seq.load(Ordering::Acquire);
            if before & 1 == 0 {
                let len = self.len.load(Ordering::Relaxed).min(N);
                let result = scan(SlotRecords {
                    slot: self,
                    index: 0,
                    len,
                });

                fence(Ordering::Acquire);
                if self.seq.load(Ordering::Relaxed) == before {
                    return result;
                }
            }
            spin_loop();
        }
    }
}

/// Records of one slot, in stored order
pub(crate) struct SlotRecords<'a, const N: usize> {
    slot: &'a Slot<N>,
    index: usize,
    len: usize,
}

impl<const N: usize> Iterator for SlotRecords<'_, N> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.index >= self.len {
            return None;
        }
        let i = self.index;
        self.index += 1;
        Some(Record::new(
            Timestamp::from_secs(self.slot.timestamps[i].load(Ordering::Relaxed)),
            self.slot.values[i].load(Ordering::Relaxed),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl<const N: usize> ExactSizeIterator for SlotRecords<'_, N> {}

/// Two-slot window buffer
pub(crate) struct WindowBuffer<const N: usize> {
    slots: [Slot<N>; 2],
}

impl<const N: usize> WindowBuffer<N> {
    pub(crate) fn new() -> Self {
        Self {
            slots: [Slot::new(), Slot::new()],
        }
    }

    fn slot(&self, generation: u32) -> &Slot<N> {
        &self.slots[(generation & 1) as usize]
    }

    /// Fill the slot of `generation`; must not be the published generation
    pub(crate) fn write(&self, generation: u32, records: &[Record]) {
        self.slot(generation).write(records);
    }

    /// Run `scan` over a consistent view of the slot of `generation`
    ///
    /// `scan` may run more than once if the slot is rewritten meanwhile.
    pub(crate) fn read<T>(
        &self,
        generation: u32,
        scan: impl FnMut(SlotRecords<'_, N>) -> T,
    ) -> T {
        self.slot(generation).read(scan)
    }
}
