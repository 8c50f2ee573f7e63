//! The segmented concurrent vector.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;
use std::sync::Mutex;

use braid_core::growth::{checked_add_size, checked_size, grown_capacity, min_segment_len};
use braid_core::VecError;

use crate::iter::Iter;
use crate::segment::Chain;

/// A growable vector that never relocates its elements.
///
/// Storage is a chain of fixed-capacity segments; growth appends a new
/// segment and leaves every existing one in place. That is what makes
/// the central guarantee possible: a reference obtained from
/// [`SegVec::get`] or returned by [`SegVec::push_back`] stays valid
/// while other threads keep appending.
///
/// `&self` operations are safe to call concurrently from any number of
/// threads; each takes the internal lock for the duration of the call
/// only. `&mut self` operations (`clear`, `reserve`, `shrink_to_fit`,
/// `assign_*`, `get_mut`, `swap`) require exclusive access, which the
/// borrow checker provides — they also invalidate element references,
/// which the borrow checker likewise rules out while one is held.
///
/// # Example
///
/// ```
/// use braid_vec::SegVec;
///
/// let v: SegVec<u32> = SegVec::new();
/// let first = v.push_back(21);
/// v.push_back(22);
/// v.grow_by(3, 23).unwrap();
/// assert_eq!(*first, 21); // still valid after growth
/// assert_eq!(v.len(), 5);
/// ```
pub struct SegVec<T> {
    chain: Mutex<Chain<T>>,
    /// Suppresses the blanket `Mutex`-derived auto impls: this type
    /// hands out element references that outlive the lock, so `Sync`
    /// needs `T: Sync`, not just `T: Send`. See the manual impls below.
    _marker: PhantomData<*mut T>,
}

// Safety: the vector owns its elements; sending it sends the `T`s.
unsafe impl<T: Send> Send for SegVec<T> {}

// Safety: `&SegVec` exposes element references that may be read from
// several threads at once (outside the lock), so sharing requires
// `T: Sync` on top of the `T: Send` the lock-mediated mutation needs.
unsafe impl<T: Send + Sync> Sync for SegVec<T> {}

impl<T> SegVec<T> {
    /// Create an empty vector. No storage is allocated until the first
    /// append or reservation.
    pub fn new() -> Self {
        Self {
            chain: Mutex::new(Chain::new()),
            _marker: PhantomData,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Chain<T>> {
        // Lock poisoning only matters if a panic escaped mid-mutation;
        // every mutation here completes or panics before linking new
        // state in, so the data is valid either way.
        match self.chain.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of live elements. Takes the lock for the read; the value
    /// may be stale by the time the caller uses it if appenders are
    /// active.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` when no elements are live.
    pub fn is_empty(&self) -> bool {
        self.lock().len() == 0
    }

    /// Total slots across all segments.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Number of segments in the chain. Diagnostic.
    pub fn segment_count(&self) -> usize {
        self.lock().segment_count()
    }

    /// Append one element and return a reference to it.
    ///
    /// Safe to call concurrently with other appends and reads. Never
    /// invalidates references to elements that existed before the call.
    /// May append one segment when the active segment is full.
    pub fn push_back(&self, value: T) -> &T {
        let mut chain = self.lock();
        let ptr = chain.push(value);
        drop(chain);
        // Safety: the element was just constructed at a stable heap
        // address that only a `&mut self` operation can invalidate, and
        // the returned borrow of `self` excludes those. Publication is
        // ordered by the mutex.
        unsafe { &*ptr }
    }

    /// Append `n` clones of `value`, performing at most one capacity
    /// expansion. Returns the index of the first appended element.
    ///
    /// Concurrency-safe like [`SegVec::push_back`].
    pub fn grow_by(&self, n: usize, value: T) -> Result<usize, VecError>
    where
        T: Clone,
    {
        let mut chain = self.lock();
        let start = chain.len();
        let new_len = checked_add_size(start, n)?;
        chain.grow_to(new_len);
        for _ in 0..n {
            chain.push(value.clone());
        }
        Ok(start)
    }

    /// Append `n` default-constructed elements; otherwise identical to
    /// [`SegVec::grow_by`].
    pub fn grow_by_default(&self, n: usize) -> Result<usize, VecError>
    where
        T: Default,
    {
        let mut chain = self.lock();
        let start = chain.len();
        let new_len = checked_add_size(start, n)?;
        chain.grow_to(new_len);
        for _ in 0..n {
            chain.push(T::default());
        }
        Ok(start)
    }

    /// Reference to the element at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&T> {
        let chain = self.lock();
        if index >= chain.len() {
            return None;
        }
        // Safety: index is live; the element address is stable until a
        // `&mut self` operation, which the returned borrow excludes;
        // the mutex ordered the element's construction before this read.
        Some(unsafe { chain.element_ref(index) })
    }

    /// Reference to the element at `index`, with the out-of-range case
    /// as a typed error.
    pub fn get_checked(&self, index: usize) -> Result<&T, VecError> {
        let chain = self.lock();
        if index >= chain.len() {
            return Err(VecError::IndexOutOfBounds {
                index,
                len: chain.len(),
            });
        }
        // Safety: as in `get`.
        Ok(unsafe { chain.element_ref(index) })
    }

    /// Reference to the first element, or `None` when empty.
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    /// Reference to the last element, or `None` when empty.
    pub fn back(&self) -> Option<&T> {
        let chain = self.lock();
        let len = chain.len();
        if len == 0 {
            return None;
        }
        // Safety: as in `get`; len is read under the same lock.
        Some(unsafe { chain.element_ref(len - 1) })
    }

    /// Exclusive reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let chain = self.chain.get_mut().unwrap_or_else(|p| p.into_inner());
        if index >= chain.len() {
            return None;
        }
        Some(chain.element_mut(index))
    }

    /// Iterate over the elements live at the time of the call.
    ///
    /// The cursor is index-addressed: each step resolves its index
    /// through the segment chain, so concurrent appends neither block
    /// nor disturb it. Elements appended after `iter()` was called are
    /// not visited.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self, self.len())
    }

    /// Drop every element but keep all segments for reuse.
    ///
    /// Requires exclusive access; invalidates all element references
    /// and iterators (statically enforced by the `&mut` receiver).
    pub fn clear(&mut self) {
        self.chain_mut().clear_elements();
    }

    /// Ensure capacity for at least `n` elements, appending at most one
    /// segment covering the shortfall.
    pub fn reserve(&mut self, n: usize) -> Result<(), VecError> {
        let n = checked_size(n)?;
        self.chain_mut().reserve_exact(n);
        Ok(())
    }

    /// Release all storage beyond the live elements by consolidating
    /// them into a single exact-size segment (everything, when empty).
    /// Invalidates all element references and iterators.
    pub fn shrink_to_fit(&mut self) {
        self.chain_mut().shrink_to_fit();
    }

    /// Replace the contents with `n` clones of `value`.
    ///
    /// Reuses existing capacity when it suffices; otherwise releases
    /// the chain and allocates one geometrically sized segment.
    pub fn assign_fill(&mut self, n: usize, value: T) -> Result<(), VecError>
    where
        T: Clone,
    {
        let n = checked_size(n)?;
        let chain = self.chain_mut();
        if n > chain.capacity() {
            let total = grown_capacity(chain.capacity(), n);
            chain.release();
            chain.append_segment(min_segment_len::<T>().max(total));
        }
        chain.truncate(chain.len().min(n));
        for index in 0..chain.len() {
            *chain.element_mut(index) = value.clone();
        }
        while chain.len() < n {
            chain.push(value.clone());
        }
        Ok(())
    }

    /// Replace the contents with the items of `iter`, in order.
    ///
    /// Overwrites the live prefix in place, then appends the surplus or
    /// destroys the leftover tail — the segment chain is reused.
    pub fn assign_iter<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = T>,
    {
        let chain = self.chain_mut();
        let mut items = iter.into_iter();
        let mut assigned = 0;
        while assigned < chain.len() {
            match items.next() {
                Some(value) => {
                    *chain.element_mut(assigned) = value;
                    assigned += 1;
                }
                None => break,
            }
        }
        if assigned < chain.len() {
            chain.truncate(assigned);
            return;
        }
        for value in items {
            chain.push(value);
        }
    }

    /// Exchange the contents of two vectors. Each keeps its own lock.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self.chain_mut(), other.chain_mut());
    }

    fn chain_mut(&mut self) -> &mut Chain<T> {
        self.chain.get_mut().unwrap_or_else(|p| p.into_inner())
    }
}

impl<T: Default> SegVec<T> {
    /// Create a vector holding `n` default-constructed elements.
    pub fn with_len(n: usize) -> Self {
        let v = Self::new();
        {
            let mut chain = v.lock();
            chain.grow_to(n);
            for _ in 0..n {
                chain.push(T::default());
            }
        }
        v
    }
}

impl<T: Clone> SegVec<T> {
    /// Create a vector holding `n` clones of `value`.
    pub fn from_elem(n: usize, value: T) -> Self {
        let v = Self::new();
        {
            let mut chain = v.lock();
            chain.grow_to(n);
            for _ in 0..n {
                chain.push(value.clone());
            }
        }
        v
    }
}

impl<T> Default for SegVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SegVec<T> {
    /// Deep copy. Locks the source for the duration, so cloning is safe
    /// while other threads append to it; the clone sees a consistent
    /// snapshot.
    fn clone(&self) -> Self {
        let source = self.lock();
        let clone = Self::new();
        {
            let mut chain = clone.lock();
            chain.grow_to(source.len());
            for index in 0..source.len() {
                // Safety: index is live under the source lock; the
                // reference does not escape this scope.
                let value: &T = unsafe { source.element_ref(index) };
                chain.push(value.clone());
            }
        }
        drop(source);
        clone
    }
}

impl<T> FromIterator<T> for SegVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::new();
        v.extend(iter);
        v
    }
}

impl<T> Extend<T> for SegVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let chain = self.chain_mut();
        for value in iter {
            chain.push(value);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for SegVec<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> Index<usize> for SegVec<T> {
    type Output = T;

    /// Panics when `index` is out of bounds, like slice indexing. Use
    /// [`SegVec::get_checked`] for a recoverable error.
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!("index {index} out of bounds"),
        }
    }
}

impl<'a, T> IntoIterator for &'a SegVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for SegVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for SegVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq> Eq for SegVec<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_back_returns_stable_reference() {
        let v: SegVec<u32> = SegVec::new();
        let first = v.push_back(1);
        for i in 2..500 {
            v.push_back(i);
        }
        assert_eq!(*first, 1);
        assert_eq!(v.len(), 499);
    }

    #[test]
    fn get_checked_reports_out_of_bounds() {
        let v: SegVec<u32> = SegVec::from([1, 2, 3]);
        assert_eq!(v.get_checked(2), Ok(&3));
        assert_eq!(
            v.get_checked(3),
            Err(VecError::IndexOutOfBounds { index: 3, len: 3 })
        );
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn index_panics_past_the_end() {
        let v: SegVec<u32> = SegVec::new();
        let _ = v[0];
    }

    #[test]
    fn grow_by_appends_n_copies_with_one_expansion() {
        let v: SegVec<u32> = SegVec::new();
        v.push_back(21);
        v.push_back(22);
        let start = v.grow_by(5, 23).unwrap();
        assert_eq!(start, 2);
        assert_eq!(v.len(), 7);
        let collected: Vec<u32> = v.iter().copied().collect();
        assert_eq!(collected, vec![21, 22, 23, 23, 23, 23, 23]);
    }

    #[test]
    fn grow_by_overflow_is_an_error() {
        let v: SegVec<u32> = SegVec::new();
        v.push_back(1);
        assert!(matches!(
            v.grow_by(usize::MAX, 2),
            Err(VecError::CapacityOverflow { .. })
        ));
        // The failed call left the vector untouched.
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn clear_retains_capacity() {
        let mut v: SegVec<u32> = (0..100).collect();
        let cap = v.capacity();
        v.clear();
        assert!(v.is_empty());
        assert_eq!(v.capacity(), cap);
    }

    #[test]
    fn shrink_to_fit_makes_capacity_exact() {
        let mut v: SegVec<u64> = (0..100).collect();
        v.shrink_to_fit();
        assert_eq!(v.capacity(), 100);
        assert_eq!(v.len(), 100);
        let collected: Vec<u64> = v.iter().copied().collect();
        assert_eq!(collected, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn shrink_to_fit_on_empty_releases_storage() {
        let mut v: SegVec<u32> = SegVec::with_len(3);
        v.clear();
        v.shrink_to_fit();
        assert_eq!(v.capacity(), 0);
    }

    #[test]
    fn assign_fill_reuses_capacity() {
        let mut v: SegVec<u32> = (0..100).collect();
        let cap = v.capacity();
        v.assign_fill(10, 7).unwrap();
        assert_eq!(v.len(), 10);
        assert_eq!(v.capacity(), cap, "fits in place, capacity reused");
        assert!(v.iter().all(|&x| x == 7));
    }

    #[test]
    fn assign_iter_shorter_truncates() {
        let mut v: SegVec<u32> = (0..10).collect();
        v.assign_iter([5, 6]);
        assert_eq!(v.len(), 2);
        assert_eq!(v[0], 5);
        assert_eq!(v[1], 6);
    }

    #[test]
    fn assign_iter_longer_appends() {
        let mut v: SegVec<u32> = SegVec::from([1, 2]);
        v.assign_iter(0..40);
        assert_eq!(v.len(), 40);
        let collected: Vec<u32> = v.iter().copied().collect();
        assert_eq!(collected, (0..40).collect::<Vec<_>>());
    }

    #[test]
    fn reserve_is_a_single_expansion() {
        let mut v: SegVec<u32> = SegVec::new();
        v.reserve(1000).unwrap();
        assert!(v.capacity() >= 1000);
        assert_eq!(v.segment_count(), 1);
    }

    #[test]
    fn swap_exchanges_contents() {
        let mut a: SegVec<u32> = SegVec::from([1, 2]);
        let mut b: SegVec<u32> = SegVec::from([9]);
        a.swap(&mut b);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0], 9);
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let v: SegVec<String> = ["a", "b"].map(String::from).into();
        let c = v.clone();
        v.push_back("c".to_string());
        assert_eq!(c.len(), 2);
        assert_eq!(v.len(), 3);
        assert_eq!(c[0], "a");
    }

    #[test]
    fn front_and_back() {
        let v: SegVec<u32> = SegVec::new();
        assert_eq!(v.front(), None);
        assert_eq!(v.back(), None);
        v.push_back(1);
        v.push_back(2);
        assert_eq!(v.front(), Some(&1));
        assert_eq!(v.back(), Some(&2));
    }

    #[test]
    fn equality_compares_elements() {
        let a: SegVec<u32> = SegVec::from([1, 2, 3]);
        let b: SegVec<u32> = (1..=3).collect();
        assert_eq!(a, b);
        b.push_back(4);
        assert_ne!(a, b);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn matches_std_vec_under_appends(values in proptest::collection::vec(any::<u32>(), 0..300)) {
                let v: SegVec<u32> = SegVec::new();
                for &x in &values {
                    v.push_back(x);
                }
                prop_assert_eq!(v.len(), values.len());
                prop_assert!(v.capacity() >= v.len());
                let collected: Vec<u32> = v.iter().copied().collect();
                prop_assert_eq!(collected, values);
            }

            #[test]
            fn size_capacity_invariant_under_mixed_ops(
                ops in proptest::collection::vec((0u8..4, any::<u16>()), 0..60),
            ) {
                let mut v: SegVec<u16> = SegVec::new();
                for (op, x) in ops {
                    match op {
                        0 => {
                            v.push_back(x);
                        }
                        1 => {
                            v.grow_by(usize::from(x) % 17, x).unwrap();
                        }
                        2 => v.clear(),
                        _ => v.shrink_to_fit(),
                    }
                    prop_assert!(v.len() <= v.capacity());
                }
            }
        }
    }
}
