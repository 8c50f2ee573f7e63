//! Segmented growable vector with reference stability under concurrent
//! append.
//!
//! [`SegVec`] stores its elements in a chain of fixed-capacity segments.
//! Growth appends a new segment; existing segments are never resized,
//! moved, or freed by any `&self` operation, so a reference to an
//! element stays valid while other threads keep appending.
//!
//! # Architecture
//!
//! ```text
//! SegVec<T>
//! └── Mutex<Chain<T>>            one lock per container, held per call
//!     └── SmallVec<[Segment<T>; 4]>
//!         └── SlotBox<T>         fixed-capacity heap slab, never moves
//! ```
//!
//! # Operation categories
//!
//! Concurrency-safe operations take `&self` and lock internally for the
//! duration of the call: [`SegVec::push_back`], [`SegVec::grow_by`],
//! [`SegVec::get`], [`SegVec::len`], iteration. Operations that the
//! caller must not overlap with any other call take `&mut self`:
//! [`SegVec::clear`], [`SegVec::reserve`], [`SegVec::shrink_to_fit`],
//! the `assign_*` family. The borrow checker enforces the split: holding
//! an element reference (tied to `&self`) rules out every `&mut self`
//! operation, which are exactly the ones that may invalidate it.
//!
//! This crate contains `unsafe` code, confined to the slot storage in
//! `raw.rs`, the segment bookkeeping in `segment.rs`, and the small
//! number of reference-lifetime extensions in `vec.rs`, each with a
//! Safety comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub(crate) mod raw;
pub(crate) mod segment;

mod iter;
mod vec;

pub use braid_core::VecError;
pub use iter::Iter;
pub use vec::SegVec;
