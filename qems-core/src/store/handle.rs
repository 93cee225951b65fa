//! Role handles onto a shared store
//!
//! The loader task and the upload handler hold a [`StoreLoader`], the render
//! task a [`StoreReader`]. Both are plain shared references and can be
//! copied into as many tasks as needed.

use super::{LoadOutcome, Status, StoreState, TimeWindowedStore};
use crate::traits::{Clock, LineSource};

/// Load side of a store
pub struct StoreLoader<'a, C, S, const N: usize> {
    store: &'a TimeWindowedStore<C, S, N>,
}

/// Lookup side of a store
pub struct StoreReader<'a, C, S, const N: usize> {
    store: &'a TimeWindowedStore<C, S, N>,
}

// Manual impls: derives would require `C: Clone, S: Clone`
impl<C, S, const N: usize> Clone for StoreLoader<'_, C, S, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, S, const N: usize> Copy for StoreLoader<'_, C, S, N> {}

impl<C, S, const N: usize> Clone for StoreReader<'_, C, S, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, S, const N: usize> Copy for StoreReader<'_, C, S, N> {}

impl<'a, C: Clock, S: LineSource, const N: usize> StoreLoader<'a, C, S, N> {
    pub(crate) fn new(store: &'a TimeWindowedStore<C, S, N>) -> Self {
        Self { store }
    }

    /// (Re)load the window, see [`TimeWindowedStore::load_from_source`]
    pub fn load(&self) -> LoadOutcome {
        self.store.load_from_source()
    }

    pub fn source_id(&self) -> &'a str {
        self.store.source_id()
    }

    pub fn status(&self) -> Status {
        self.store.status()
    }

    pub fn state(&self) -> StoreState {
        self.store.state()
    }
}

impl<'a, C: Clock, S: LineSource, const N: usize> StoreReader<'a, C, S, N> {
    pub(crate) fn new(store: &'a TimeWindowedStore<C, S, N>) -> Self {
        Self { store }
    }

    pub fn source_id(&self) -> &'a str {
        self.store.source_id()
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    pub fn is_source_available(&self) -> bool {
        self.store.is_source_available()
    }

    pub fn try_active_value(&self) -> Option<i32> {
        self.store.try_active_value()
    }

    pub fn active_value(&self) -> i32 {
        self.store.active_value()
    }
}
