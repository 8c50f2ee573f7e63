//! Contiguous storage segments and the growable segment chain.
//!
//! A [`Segment`] is a fixed-capacity slab with a constructed-prefix
//! length. A [`Chain`] is an ordered list of segments plus the logical
//! size and capacity spanning them. The chain only ever grows by
//! appending a segment at the tail; a segment's slab never moves.
//!
//! Invariant: constructed elements form a prefix in chain order. Every
//! segment before the active one is full, the active one is partially
//! filled, and everything after it is empty. Logical index `i` therefore
//! resolves to `(segment, offset)` by walking the chain and subtracting
//! per-segment lengths — cost proportional to the segment count, never
//! the element count.

use smallvec::SmallVec;

use braid_core::growth::{min_segment_len, next_segment_len};

use crate::raw::SlotBox;

/// A single fixed-capacity storage segment.
pub(crate) struct Segment<T> {
    slots: SlotBox<T>,
    /// Length of the constructed prefix. Slots `0..len` are initialized.
    len: usize,
}

impl<T> Segment<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotBox::new(capacity),
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.slots.capacity()
    }

    /// Construct `value` in the next free slot and return its address.
    ///
    /// Panics in debug builds if the segment is full; the chain checks
    /// capacity before dispatching here.
    pub(crate) fn push(&mut self, value: T) -> *const T {
        debug_assert!(!self.is_full());
        // Safety: `len < capacity` and slot `len` is outside the
        // constructed prefix, so it is uninitialized and unreferenced.
        unsafe {
            self.slots.write(self.len, value);
            self.len += 1;
            self.slots.slot_ptr(self.len - 1)
        }
    }

    /// Shared reference to the element at `offset`, detached from the
    /// borrow of `self`.
    ///
    /// # Safety
    ///
    /// `offset < len`, the slab must outlive `'a`, and no exclusive
    /// operation (truncate, assign, move-out) may touch this slot while
    /// the reference lives.
    pub(crate) unsafe fn element_ref<'a>(&self, offset: usize) -> &'a T {
        debug_assert!(offset < self.len);
        // Safety: offset is inside the constructed prefix; aliasing and
        // lifetime per the contract.
        unsafe { self.slots.slot_ref(offset) }
    }

    /// Exclusive reference to the element at `offset`.
    ///
    /// # Safety
    ///
    /// `offset < len` and no other reference to this element may be
    /// live for the duration of `'a`.
    pub(crate) unsafe fn element_mut<'a>(&mut self, offset: usize) -> &'a mut T {
        debug_assert!(offset < self.len);
        // Safety: inside the constructed prefix; exclusivity per the
        // contract.
        unsafe { self.slots.slot_mut(offset) }
    }

    /// Move the live element at `offset` out, shrinking the prefix is
    /// the caller's job — the slot is simply marked dead by convention
    /// of only calling this during a full drain.
    ///
    /// # Safety
    ///
    /// `offset < len`, no reference to the slot is live, and the caller
    /// must not read the slot again before truncating the segment.
    pub(crate) unsafe fn take_for_drain(&self, offset: usize) -> T {
        debug_assert!(offset < self.len);
        // Safety: per the contract.
        unsafe { self.slots.take(offset) }
    }

    /// Drop elements `new_len..len` and shrink the prefix.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        assert!(new_len <= self.len);
        // Safety: `new_len..len` is inside the constructed prefix and
        // unreferenced under `&mut self`.
        unsafe { self.slots.drop_range(new_len, self.len) };
        self.len = new_len;
    }

    /// Forget all elements without dropping them. Used after a drain
    /// that moved every value out.
    pub(crate) fn forget_all(&mut self) {
        self.len = 0;
    }
}

impl<T> Drop for Segment<T> {
    fn drop(&mut self) {
        self.truncate(0);
    }
}

/// Ordered list of segments with logical-size bookkeeping.
pub(crate) struct Chain<T> {
    segments: SmallVec<[Segment<T>; 4]>,
    /// Index of the segment receiving appends. Meaningless while the
    /// chain is empty of segments.
    active: usize,
    len: usize,
    capacity: usize,
}

impl<T> Chain<T> {
    pub(crate) fn new() -> Self {
        Self {
            segments: SmallVec::new(),
            active: 0,
            len: 0,
            capacity: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Append a segment of exactly `capacity` slots at the tail.
    pub(crate) fn append_segment(&mut self, capacity: usize) {
        // The segment is fully built before it is linked in, so a
        // failed allocation leaves the chain in its prior valid state.
        let segment = Segment::with_capacity(capacity);
        self.segments.push(segment);
        self.capacity += capacity;
    }

    /// Ensure total capacity of at least `requested`, appending at most
    /// one geometrically sized segment.
    pub(crate) fn grow_to(&mut self, requested: usize) {
        if requested > self.capacity {
            let seg_len = next_segment_len::<T>(self.capacity, requested);
            self.append_segment(seg_len);
        }
    }

    /// Ensure total capacity of at least `requested`, appending at most
    /// one segment of exactly the shortfall (floored at the per-type
    /// minimum). Used by `reserve`, which is an explicit request rather
    /// than a growth-curve step.
    pub(crate) fn reserve_exact(&mut self, requested: usize) {
        if requested > self.capacity {
            let seg_len = min_segment_len::<T>().max(requested - self.capacity);
            self.append_segment(seg_len);
        }
    }

    /// Construct `value` at logical index `len`, growing if needed.
    /// Returns the element's stable address.
    pub(crate) fn push(&mut self, value: T) -> *const T {
        self.grow_to(self.len + 1);
        while self.segments[self.active].is_full() {
            self.active += 1;
        }
        let ptr = self.segments[self.active].push(value);
        self.len += 1;
        ptr
    }

    /// Resolve logical index to `(segment index, offset)`.
    ///
    /// `index` must be less than `len()`.
    pub(crate) fn locate(&self, index: usize) -> (usize, usize) {
        debug_assert!(index < self.len);
        let mut remaining = index;
        for (seg_idx, segment) in self.segments.iter().enumerate() {
            if remaining < segment.len() {
                return (seg_idx, remaining);
            }
            remaining -= segment.len();
        }
        unreachable!("index {index} within len {} must resolve", self.len)
    }

    /// Shared reference to the element at `index`, detached from the
    /// borrow of `self`.
    ///
    /// # Safety
    ///
    /// `index < len()`, the segment slabs must outlive `'a`, and no
    /// exclusive operation may touch this element while the reference
    /// lives.
    pub(crate) unsafe fn element_ref<'a>(&self, index: usize) -> &'a T {
        let (seg_idx, offset) = self.locate(index);
        // Safety: locate guarantees the offset is inside the segment's
        // constructed prefix; the rest per the contract.
        unsafe { self.segments[seg_idx].element_ref(offset) }
    }

    /// Exclusive reference to the element at `index`.
    pub(crate) fn element_mut(&mut self, index: usize) -> &mut T {
        let (seg_idx, offset) = self.locate(index);
        // Safety: inside the constructed prefix; `&mut self` guarantees
        // exclusivity, and the returned borrow is tied to it.
        unsafe { self.segments[seg_idx].element_mut(offset) }
    }

    /// Drop all elements but keep every segment allocated for reuse.
    pub(crate) fn clear_elements(&mut self) {
        for segment in &mut self.segments {
            segment.truncate(0);
        }
        self.len = 0;
        self.active = 0;
    }

    /// Drop elements `new_len..len`, keeping segments allocated.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        assert!(new_len <= self.len);
        let mut remaining = new_len;
        for segment in &mut self.segments {
            let keep = remaining.min(segment.len());
            segment.truncate(keep);
            remaining -= keep;
        }
        self.len = new_len;
        // Active segment is the first non-full one.
        self.active = 0;
        while self.active < self.segments.len() && self.segments[self.active].is_full() {
            self.active += 1;
        }
        if self.active == self.segments.len() {
            self.active = self.segments.len().saturating_sub(1);
        }
    }

    /// Drop all elements and release every segment.
    pub(crate) fn release(&mut self) {
        self.segments.clear();
        self.len = 0;
        self.capacity = 0;
        self.active = 0;
    }

    /// Consolidate all elements into a single segment of exactly
    /// `len()` slots, releasing every other segment. With no elements,
    /// releases all storage. Every previously returned element address
    /// is invalidated.
    pub(crate) fn shrink_to_fit(&mut self) {
        if self.len == 0 {
            self.release();
            return;
        }
        if self.segments.len() == 1 && self.capacity == self.len {
            return;
        }
        let mut compact = Segment::with_capacity(self.len);
        for segment in &self.segments {
            for offset in 0..segment.len() {
                // Safety: offset is live, no references are outstanding
                // under `&mut self`, and `forget_all` below stops the
                // source segment from dropping the moved-out values.
                let value = unsafe { segment.take_for_drain(offset) };
                compact.push(value);
            }
        }
        for segment in &mut self.segments {
            segment.forget_all();
        }
        self.segments.clear();
        self.capacity = compact.capacity();
        self.active = 0;
        self.segments.push(compact);
    }
}
