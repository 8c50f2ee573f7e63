//! Reusable container test fixtures.
//!
//! Two standard fixtures for lifecycle validation:
//!
//! - [`DropTally`] — shared construction/drop counters.
//! - [`Tallied`] — an element that reports its lifecycle to a tally.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared counters for element constructions and drops.
///
/// Clone it freely; all clones observe the same counters. After a
/// container holding [`Tallied`] elements is dropped or cleared,
/// [`DropTally::live`] should read zero.
#[derive(Clone, Default)]
pub struct DropTally {
    created: Arc<AtomicUsize>,
    dropped: Arc<AtomicUsize>,
}

impl DropTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total elements constructed against this tally.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Total elements dropped against this tally.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Elements constructed but not yet dropped.
    pub fn live(&self) -> usize {
        self.created() - self.dropped()
    }

    /// Wrap `value` in a [`Tallied`] element counted by this tally.
    pub fn element<T>(&self, value: T) -> Tallied<T> {
        Tallied::new(self.clone(), value)
    }
}

/// Element wrapper that reports construction and drop to a [`DropTally`].
///
/// Clones count as fresh constructions, so move-vs-copy mistakes in a
/// container show up as mismatched totals.
pub struct Tallied<T> {
    tally: DropTally,
    pub value: T,
}

impl<T> Tallied<T> {
    pub fn new(tally: DropTally, value: T) -> Self {
        tally.created.fetch_add(1, Ordering::SeqCst);
        Self { tally, value }
    }
}

impl<T: Clone> Clone for Tallied<T> {
    fn clone(&self) -> Self {
        Tallied::new(self.tally.clone(), self.value.clone())
    }
}

impl<T> Drop for Tallied<T> {
    fn drop(&mut self) {
        self.tally.dropped.fetch_add(1, Ordering::SeqCst);
    }
}
