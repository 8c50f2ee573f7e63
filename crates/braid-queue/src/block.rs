//! Fixed-capacity storage block for the queue chain.

/// One block of the chain: a fixed slab of slots plus two cursors.
///
/// `used..filled` is the live range. Pushes write at `filled`, pops
/// take at `used`. A block that has been filled and drained to capacity
/// is recycled by [`Block::reset`]; its storage is reused in place.
///
/// Slots outside the live range are always `None`, so dropping a block
/// drops exactly the live elements.
pub(crate) struct Block<T> {
    slots: Box<[Option<T>]>,
    /// Pop cursor. Nonzero only on the head block.
    pub(crate) used: usize,
    /// Push cursor. One past the last live element.
    pub(crate) filled: usize,
    /// Arena index of the next block in chain order.
    pub(crate) next: Option<usize>,
}

impl<T> Block<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity).map(|_| None).collect();
        Self {
            slots,
            used: 0,
            filled: 0,
            next: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// `true` when the push cursor has reached the end of the slab.
    pub(crate) fn is_full(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// `true` once every slot has been filled and drained; the block is
    /// ready for [`Block::reset`].
    pub(crate) fn is_spent(&self) -> bool {
        self.used == self.slots.len()
    }

    /// Write `value` at the push cursor. The block must not be full.
    pub(crate) fn push(&mut self, value: T) {
        debug_assert!(!self.is_full());
        self.slots[self.filled] = Some(value);
        self.filled += 1;
    }

    /// Take the front element, if the live range is nonempty.
    pub(crate) fn pop(&mut self) -> Option<T> {
        if self.used == self.filled {
            return None;
        }
        let value = self.slots[self.used].take();
        self.used += 1;
        value
    }

    /// Shared reference to the live element at `offset` past the pop
    /// cursor.
    pub(crate) fn get(&self, offset: usize) -> Option<&T> {
        let index = self.used + offset;
        if index >= self.filled {
            return None;
        }
        self.slots[index].as_ref()
    }

    /// Drop the live range and rewind both cursors for reuse.
    pub(crate) fn reset(&mut self) {
        for slot in &mut self.slots[self.used..self.filled] {
            *slot = None;
        }
        self.used = 0;
        self.filled = 0;
    }
}
