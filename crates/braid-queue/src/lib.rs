//! Segmented FIFO queue with block recycling.
//!
//! [`SegQueue`] stores its elements in a singly linked chain of
//! fixed-capacity blocks. Pushes fill the write block; pops drain the
//! head block. A head block that has been both filled and drained to
//! capacity is not freed: its cursors are reset and it is relinked at
//! the tail, ready to be filled again. Under a steady producer/consumer
//! load the queue therefore stops allocating entirely and cycles
//! through the blocks it already owns.
//!
//! # Architecture
//!
//! ```text
//! SegQueue<T>
//! └── Mutex<BlockChain<T>>      one lock per container, held per call
//!     └── Vec<Block<T>>          arena; chain order via next indices
//!         head ─▶ … ─▶ write ─▶ … ─▶ tail
//! ```
//!
//! Blocks live in an arena and link to each other by index, so
//! relinking a recycled block is an index rewrite and block storage
//! never moves.
//!
//! # Operation categories
//!
//! [`SegQueue::push`], [`SegQueue::try_pop`], [`SegQueue::len`],
//! [`SegQueue::is_empty`] and [`SegQueue::clear`] take `&self` and are
//! safe to call from any number of threads. [`SegQueue::iter`] takes
//! `&mut self`: walking the chain cannot overlap with pushes or pops,
//! and the receiver type enforces that.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod block;
mod iter;
mod queue;

pub use iter::Iter;
pub use queue::SegQueue;
