//! The segmented FIFO queue.

use std::fmt;
use std::sync::Mutex;

use braid_core::growth::next_segment_len;

use crate::block::Block;
use crate::iter::Iter;

/// The lock-protected state: an arena of blocks plus the chain cursors.
///
/// `head` is the block pops drain, `write` the block pushes fill, and
/// `tail` the end of the chain. Blocks between `write` and `tail` are
/// recycled blocks waiting to be filled again.
pub(crate) struct BlockChain<T> {
    pub(crate) blocks: Vec<Block<T>>,
    pub(crate) head: Option<usize>,
    write: Option<usize>,
    tail: Option<usize>,
    pub(crate) len: usize,
}

impl<T> BlockChain<T> {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            head: None,
            write: None,
            tail: None,
            len: 0,
        }
    }

    fn push(&mut self, value: T) {
        let w = self.writable_block();
        self.blocks[w].push(value);
        self.len += 1;
        // A filled write block hands over to the next one when the
        // chain has one ready (a recycled block or nothing follows the
        // tail, and the tail case allocates lazily on the next push).
        if self.blocks[w].is_full() && self.write != self.tail {
            self.write = self.blocks[w].next;
        }
    }

    /// Index of a block with room for one more element. A full write
    /// block hands over to its successor (a recycled block is always
    /// empty); with no successor, a fresh block is allocated and linked
    /// at the tail.
    fn writable_block(&mut self) -> usize {
        match self.write {
            None => self.link_fresh_block(1, 0),
            Some(w) if self.blocks[w].is_full() => match self.blocks[w].next {
                Some(next) => {
                    self.write = Some(next);
                    next
                }
                None => {
                    let live = self.len;
                    self.link_fresh_block(live + 1, live)
                }
            },
            Some(w) => w,
        }
    }

    /// Allocate a block sized geometrically for `requested_total` live
    /// elements (of which `live` already exist) and link it at the tail.
    fn link_fresh_block(&mut self, requested_total: usize, live: usize) -> usize {
        let capacity = next_segment_len::<T>(live, requested_total);
        self.blocks.push(Block::with_capacity(capacity));
        let index = self.blocks.len() - 1;
        match self.tail {
            None => self.head = Some(index),
            Some(t) => self.blocks[t].next = Some(index),
        }
        self.tail = Some(index);
        self.write = Some(index);
        index
    }

    fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        loop {
            let h = self.head?;
            if let Some(value) = self.blocks[h].pop() {
                self.len -= 1;
                // Recycle: a head block that was filled and drained to
                // capacity rewinds its cursors and moves behind the
                // tail, keeping its storage for future pushes. Nothing
                // is freed.
                if self.blocks[h].is_spent() {
                    self.blocks[h].reset();
                    self.rotate_head_to_tail(h);
                }
                return Some(value);
            }
            // An empty recycled block reached the head position ahead
            // of the live region; rotate it behind the tail and keep
            // looking. `len > 0` guarantees a live block downstream.
            self.blocks[h].reset();
            if !self.rotate_head_to_tail(h) {
                return None;
            }
        }
    }

    /// Relink block `h` (the current head, already reset) behind the
    /// tail. Returns `false` when `h` is the only block in the chain.
    fn rotate_head_to_tail(&mut self, h: usize) -> bool {
        match self.tail {
            Some(t) if t != h => {
                self.head = self.blocks[h].next.take();
                self.blocks[t].next = Some(h);
                self.tail = Some(h);
                true
            }
            _ => false,
        }
    }

    fn clear(&mut self) {
        let mut cursor = self.head;
        while let Some(index) = cursor {
            cursor = self.blocks[index].next;
            self.blocks[index].reset();
        }
        self.write = self.head;
        self.len = 0;
    }

    fn capacity(&self) -> usize {
        let mut total = 0;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let block = &self.blocks[index];
            total += block.capacity() - block.used;
            cursor = block.next;
        }
        total
    }
}

/// A growable FIFO queue that recycles its storage.
///
/// `&self` operations lock internally and are safe to call from any
/// number of threads. Popping never blocks waiting for an element:
/// [`SegQueue::try_pop`] returns `None` when the queue is empty at the
/// moment the lock is taken.
///
/// Once the chain holds enough capacity for the working set of a
/// producer/consumer load, drained blocks are reused in place and the
/// queue stops allocating ([`SegQueue::block_count`] stops growing).
///
/// # Example
///
/// ```
/// use braid_queue::SegQueue;
///
/// let q: SegQueue<u32> = SegQueue::new();
/// q.push(1);
/// q.push(2);
/// assert_eq!(q.try_pop(), Some(1));
/// assert_eq!(q.try_pop(), Some(2));
/// assert_eq!(q.try_pop(), None);
/// ```
pub struct SegQueue<T> {
    chain: Mutex<BlockChain<T>>,
}

impl<T> SegQueue<T> {
    /// Create an empty queue. No storage is allocated until the first
    /// push.
    pub fn new() -> Self {
        Self {
            chain: Mutex::new(BlockChain::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BlockChain<T>> {
        match self.chain.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn chain_mut(&mut self) -> &mut BlockChain<T> {
        self.chain.get_mut().unwrap_or_else(|p| p.into_inner())
    }

    /// Append `value` at the back.
    pub fn push(&self, value: T) {
        self.lock().push(value);
    }

    /// Remove and return the front element, or `None` when the queue is
    /// empty at the moment the lock is taken.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().pop()
    }

    /// `true` when no elements are live. With concurrent producers the
    /// answer may be stale by the time the caller acts on it.
    pub fn is_empty(&self) -> bool {
        self.lock().len == 0
    }

    /// Number of live elements. Advisory under concurrency, like
    /// [`SegQueue::is_empty`].
    pub fn len(&self) -> usize {
        self.lock().len
    }

    /// Element slots currently usable across the chain. Diagnostic.
    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Number of blocks the queue has ever allocated. Under a steady
    /// load this stops growing once recycling covers the working set.
    pub fn block_count(&self) -> usize {
        self.lock().blocks.len()
    }

    /// Drop every element but keep all blocks for reuse.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Iterate the live elements front to back.
    ///
    /// Walking the chain cannot overlap with pushes or pops, which the
    /// `&mut` receiver enforces.
    pub fn iter(&mut self) -> Iter<'_, T> {
        Iter::new(self.chain_mut())
    }
}

impl<T> Default for SegQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for SegQueue<T> {
    /// Deep copy of the live elements in pop order. Locks the source
    /// for the duration, so cloning is safe while other threads push
    /// and pop; the clone sees a consistent snapshot.
    fn clone(&self) -> Self {
        let source = self.lock();
        let clone = Self::new();
        {
            let mut chain = clone.lock();
            let mut cursor = source.head;
            while let Some(index) = cursor {
                let block = &source.blocks[index];
                let mut offset = 0;
                while let Some(value) = block.get(offset) {
                    chain.push(value.clone());
                    offset += 1;
                }
                cursor = block.next;
            }
        }
        drop(source);
        clone
    }
}

impl<T> Extend<T> for SegQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let chain = self.chain_mut();
        for value in iter {
            chain.push(value);
        }
    }
}

impl<T> FromIterator<T> for SegQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut q = Self::new();
        q.extend(iter);
        q
    }
}

impl<T, const N: usize> From<[T; N]> for SegQueue<T> {
    fn from(values: [T; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<T> fmt::Debug for SegQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let chain = self.lock();
        f.debug_struct("SegQueue")
            .field("len", &chain.len)
            .field("blocks", &chain.blocks.len())
            .finish_non_exhaustive()
    }
}
