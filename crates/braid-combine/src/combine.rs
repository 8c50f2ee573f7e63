//! The per-thread accumulator.

use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::BuildHasher;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::thread::{self, ThreadId};

const MIN_BUCKETS: usize = 8;

/// One thread's slot: its id, its value, and the chain link.
///
/// `next` is written once, before the entry is published with a
/// Release CAS, and never changes afterwards; readers that loaded the
/// chain head with Acquire may follow it freely.
struct Entry<T> {
    thread: ThreadId,
    value: T,
    next: *mut Entry<T>,
}

/// A value with one private copy per thread.
///
/// Each thread that calls [`Combinable::local`] gets a reference to its
/// own default-constructed copy; updates go through interior mutability
/// on `T` (a [`Cell`], an atomic) and never contend with other threads.
/// The owner later folds all copies with [`Combinable::combine`].
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::thread;
/// use braid_combine::Combinable;
///
/// let mut sums: Combinable<Cell<u64>> = Combinable::new();
/// thread::scope(|scope| {
///     for _ in 0..4 {
///         let sums = &sums;
///         scope.spawn(move || {
///             let local = sums.local();
///             local.set(local.get() + 1);
///         });
///     }
/// });
/// let total = sums.combine(|a, b| Cell::new(a.get() + b.get()));
/// assert_eq!(total.get(), 4);
/// ```
///
/// [`Cell`]: std::cell::Cell
pub struct Combinable<T> {
    buckets: Box<[AtomicPtr<Entry<T>>]>,
    hasher: RandomState,
    _marker: PhantomData<T>,
}

// Safety: entries hold `T`s that are created on one thread and read by
// the owner during `&mut self` combination or drop, so they move
// between threads; `T: Send` covers that. `&self` access never lets two
// threads reach the same entry's value (lookup is keyed by the caller's
// own thread id), so `T: Sync` is not required for sharing.
unsafe impl<T: Send> Send for Combinable<T> {}
unsafe impl<T: Send> Sync for Combinable<T> {}

impl<T> Combinable<T> {
    /// Create an accumulator sized for the default thread count hint.
    pub fn new() -> Self {
        Self::with_thread_hint(MIN_BUCKETS)
    }

    /// Create an accumulator whose bucket table is sized for roughly
    /// `threads` participating threads. The hint only affects chain
    /// lengths, never correctness.
    pub fn with_thread_hint(threads: usize) -> Self {
        let bucket_count = MIN_BUCKETS.max(threads / 8);
        let buckets = (0..bucket_count)
            .map(|_| AtomicPtr::new(ptr::null_mut()))
            .collect();
        Self {
            buckets,
            hasher: RandomState::new(),
            _marker: PhantomData,
        }
    }

    /// Number of buckets in the table. Diagnostic.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn bucket_for(&self, thread: ThreadId) -> &AtomicPtr<Entry<T>> {
        let index = self.hasher.hash_one(thread) as usize % self.buckets.len();
        &self.buckets[index]
    }

    /// Walk `bucket`'s chain for `thread`'s entry.
    fn find(&self, bucket: &AtomicPtr<Entry<T>>, thread: ThreadId) -> Option<*mut Entry<T>> {
        let mut cursor = bucket.load(Ordering::Acquire);
        while !cursor.is_null() {
            // Safety: cursor came from a published chain head; entries
            // are never freed while `&self` borrows exist (freeing
            // happens only in `&mut self` clear and in drop).
            let entry = unsafe { &*cursor };
            if entry.thread == thread {
                return Some(cursor);
            }
            cursor = entry.next;
        }
        None
    }

    /// Prepend a fresh entry for `thread` and return it.
    ///
    /// Only the calling thread ever inserts for its own id, so the CAS
    /// retry loop contends with other threads' insertions in the same
    /// bucket, never with a duplicate of this one.
    fn insert(&self, bucket: &AtomicPtr<Entry<T>>, thread: ThreadId, value: T) -> *mut Entry<T> {
        let entry = Box::into_raw(Box::new(Entry {
            thread,
            value,
            next: ptr::null_mut(),
        }));
        let mut head = bucket.load(Ordering::Acquire);
        loop {
            // Safety: the entry is unpublished; this thread is its only
            // accessor until the CAS below succeeds.
            unsafe { (*entry).next = head };
            match bucket.compare_exchange_weak(head, entry, Ordering::Release, Ordering::Acquire) {
                Ok(_) => return entry,
                Err(current) => head = current,
            }
        }
    }

    /// Fold every thread's value into one result with `func`, front of
    /// each bucket chain first. Returns `T::default()` when no thread
    /// has touched the accumulator.
    ///
    /// The fold order across threads is unspecified; use a commutative,
    /// associative `func`.
    pub fn combine<F>(&mut self, mut func: F) -> T
    where
        T: Default + Clone,
        F: FnMut(T, T) -> T,
    {
        let mut result: Option<T> = None;
        for bucket in self.buckets.iter_mut() {
            let mut cursor = *bucket.get_mut();
            while !cursor.is_null() {
                // Safety: exclusive access; every published entry is
                // valid until clear or drop.
                let entry = unsafe { &*cursor };
                result = Some(match result {
                    None => entry.value.clone(),
                    Some(acc) => func(acc, entry.value.clone()),
                });
                cursor = entry.next;
            }
        }
        result.unwrap_or_default()
    }

    /// Call `func` on every thread's value.
    pub fn combine_each<F>(&mut self, mut func: F)
    where
        F: FnMut(&mut T),
    {
        for bucket in self.buckets.iter_mut() {
            let mut cursor = *bucket.get_mut();
            while !cursor.is_null() {
                // Safety: exclusive access, as in `combine`.
                let entry = unsafe { &mut *cursor };
                func(&mut entry.value);
                cursor = entry.next;
            }
        }
    }

    /// Discard every thread's entry. Threads that call
    /// [`Combinable::local`] afterwards start from a fresh default.
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            let mut cursor = std::mem::replace(bucket.get_mut(), ptr::null_mut());
            while !cursor.is_null() {
                // Safety: exclusive access; the chain was just unlinked,
                // so each entry is freed exactly once.
                let entry = unsafe { Box::from_raw(cursor) };
                cursor = entry.next;
            }
        }
    }
}

impl<T: Default> Combinable<T> {
    /// The calling thread's value, default-constructed on first use.
    ///
    /// Mutation goes through interior mutability on `T`; no other
    /// thread can reach this entry through the shared reference.
    pub fn local(&self) -> &T {
        self.local_tracked().0
    }

    /// Like [`Combinable::local`], also reporting whether the entry
    /// already existed before this call.
    pub fn local_tracked(&self) -> (&T, bool) {
        let thread = thread::current().id();
        let bucket = self.bucket_for(thread);
        match self.find(bucket, thread) {
            // Safety: the entry stays valid and unaliased-for-writes
            // while the `&self` borrow lives; only this thread reaches
            // it through `&self` operations.
            Some(entry) => (unsafe { &(*entry).value }, true),
            None => {
                let entry = self.insert(bucket, thread, T::default());
                // Safety: as above.
                (unsafe { &(*entry).value }, false)
            }
        }
    }
}

impl<T> Default for Combinable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for Combinable<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> fmt::Debug for Combinable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combinable")
            .field("buckets", &self.buckets.len())
            .finish_non_exhaustive()
    }
}
