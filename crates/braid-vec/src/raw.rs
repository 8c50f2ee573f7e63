//! Low-level slot storage for segment buffers.
//!
//! [`SlotBox`] is a fixed-capacity heap slab of possibly-uninitialized
//! slots. It is the only place in this crate that touches raw memory.
//! All slot access goes through raw pointers derived from `UnsafeCell`,
//! never through Rust references to the slab, so shared references to
//! individual initialized slots can outlive the container's lock while
//! other slots are still being written.
//!
//! The slab itself is allocated once and never grows; the containing
//! `Box` may be moved freely (only the box pointer moves, the slab
//! stays put), which is what gives the vector its reference stability.
//!
//! Initialization tracking is the caller's job: [`SlotBox`] does not
//! know which slots are live and will not drop anything on its own.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;

/// Fixed-capacity slab of possibly-uninitialized slots.
pub(crate) struct SlotBox<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

impl<T> SlotBox<T> {
    /// Allocate a slab of `capacity` uninitialized slots.
    pub(crate) fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();
        Self { slots }
    }

    /// Number of slots in the slab.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Raw pointer to slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be less than `capacity()`.
    pub(crate) unsafe fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index < self.slots.len());
        // Safety: index is in bounds per the contract.
        unsafe { self.slots.get_unchecked(index).get().cast::<T>() }
    }

    /// Initialize slot `index` with `value`.
    ///
    /// # Safety
    ///
    /// `index < capacity()`, the slot must currently be uninitialized,
    /// and no other thread may be accessing this slot.
    pub(crate) unsafe fn write(&self, index: usize, value: T) {
        // Safety: in bounds; the slot is uninitialized, so nothing is
        // dropped by the overwrite; exclusivity per the contract.
        unsafe { self.slot_ptr(index).write(value) };
    }

    /// Shared reference to the initialized slot `index`, with a
    /// caller-chosen lifetime.
    ///
    /// # Safety
    ///
    /// `index < capacity()` and the slot must be initialized. The slab
    /// must outlive `'a`, the slot must not be dropped, moved out, or
    /// written through [`SlotBox::assign`] while the reference lives,
    /// and any write that initialized the slot must happen-before this
    /// call (for the vector, the container mutex provides the edge).
    pub(crate) unsafe fn slot_ref<'a>(&self, index: usize) -> &'a T {
        // Safety: initialized, aliasing and lifetime per the contract.
        unsafe { &*self.slot_ptr(index) }
    }

    /// Exclusive reference to the initialized slot `index`.
    ///
    /// # Safety
    ///
    /// As [`SlotBox::slot_ref`], plus: no other reference to this slot
    /// may exist for the duration of `'a`.
    pub(crate) unsafe fn slot_mut<'a>(&self, index: usize) -> &'a mut T {
        // Safety: initialized and exclusive per the contract.
        unsafe { &mut *self.slot_ptr(index) }
    }

    /// Move the value out of slot `index`, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// `index < capacity()`, the slot must be initialized, no reference
    /// to it may be live, and the caller must stop treating the slot as
    /// initialized.
    pub(crate) unsafe fn take(&self, index: usize) -> T {
        // Safety: initialized and exclusive per the contract.
        unsafe { self.slot_ptr(index).read() }
    }

    /// Drop the values in slots `from..to`, leaving them uninitialized.
    ///
    /// # Safety
    ///
    /// Every slot in `from..to` must be initialized and unreferenced,
    /// and `to <= capacity()`.
    pub(crate) unsafe fn drop_range(&self, from: usize, to: usize) {
        for index in from..to {
            // Safety: initialized and exclusive per the contract.
            unsafe { self.slot_ptr(index).drop_in_place() };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let slab = SlotBox::new(4);
        unsafe {
            slab.write(0, 7u32);
            slab.write(3, 9u32);
            assert_eq!(*slab.slot_ref(0), 7);
            assert_eq!(*slab.slot_ref(3), 9);
            slab.drop_range(0, 1);
            slab.drop_range(3, 4);
        }
    }

    #[test]
    fn take_moves_the_value_out() {
        let slab = SlotBox::new(2);
        unsafe {
            slab.write(0, String::from("braid"));
            let s = slab.take(0);
            assert_eq!(s, "braid");
        }
        // Slot 0 is uninitialized again; dropping the slab must not
        // touch it.
    }

    #[test]
    fn capacity_reports_slot_count() {
        let slab: SlotBox<u64> = SlotBox::new(32);
        assert_eq!(slab.capacity(), 32);
    }
}
