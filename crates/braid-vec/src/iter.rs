//! Index-cursor iteration over a [`SegVec`].

use crate::vec::SegVec;

/// Iterator over the elements of a [`SegVec`].
///
/// The length is snapshotted when the iterator is created; elements
/// appended afterwards are not visited. Each step resolves its index
/// through the segment chain under the container lock, so iteration
/// interleaves freely with concurrent appends from other threads.
///
/// Returned by [`SegVec::iter`].
pub struct Iter<'a, T> {
    vec: &'a SegVec<T>,
    front: usize,
    back: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(vec: &'a SegVec<T>, len: usize) -> Self {
        Self {
            vec,
            front: 0,
            back: len,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        // Indices below the snapshot stay live: the `&'a SegVec` borrow
        // rules out every operation that could remove elements.
        let item = self.vec.get(self.front);
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.vec.get(self.back)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> std::iter::FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            vec: self.vec,
            front: self.front,
            back: self.back,
        }
    }
}
