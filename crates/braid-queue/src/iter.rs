//! Chain-walking iteration over a [`SegQueue`].

use crate::queue::BlockChain;

/// Iterator over the live elements of a [`SegQueue`], front to back.
///
/// Walks the block chain from the head, skipping recycled blocks that
/// hold no elements. Obtained from [`SegQueue::iter`], which takes
/// `&mut self`: the chain cannot change while an iterator exists.
///
/// [`SegQueue`]: crate::SegQueue
/// [`SegQueue::iter`]: crate::SegQueue::iter
pub struct Iter<'a, T> {
    chain: &'a BlockChain<T>,
    block: Option<usize>,
    offset: usize,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(chain: &'a BlockChain<T>) -> Self {
        Self {
            block: chain.head,
            offset: 0,
            remaining: chain.len,
            chain,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            let index = self.block?;
            let block = &self.chain.blocks[index];
            if let Some(value) = block.get(self.offset) {
                self.offset += 1;
                self.remaining -= 1;
                return Some(value);
            }
            self.block = block.next;
            self.offset = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> std::iter::FusedIterator for Iter<'_, T> {}
