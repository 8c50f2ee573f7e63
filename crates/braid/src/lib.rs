//! Braid: concurrency-friendly containers behind one dependency.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Braid sub-crates. For most users, adding `braid` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::thread;
//! use braid::prelude::*;
//!
//! // Appends from many threads; references stay valid throughout.
//! let log: SegVec<u64> = SegVec::new();
//! let work: SegQueue<u64> = SegQueue::new();
//!
//! thread::scope(|scope| {
//!     for tid in 0..4 {
//!         let log = &log;
//!         let work = &work;
//!         scope.spawn(move || {
//!             for i in 0..100 {
//!                 work.push(tid * 100 + i);
//!             }
//!             while let Some(item) = work.try_pop() {
//!                 log.push_back(item);
//!             }
//!         });
//!     }
//! });
//!
//! assert_eq!(log.len(), 400);
//! assert!(work.is_empty());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`vec`] | `braid-vec` | [`SegVec`]: segmented vector, stable element references |
//! | [`queue`] | `braid-queue` | [`SegQueue`]: FIFO queue that recycles drained blocks |
//! | [`combine`] | `braid-combine` | [`Combinable`]: per-thread accumulator |
//! | [`growth`] | `braid-core` | Shared segment growth policy |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared segment growth policy (`braid-core`).
pub use braid_core::growth;

/// Segmented vector with stable element references (`braid-vec`).
pub use braid_vec as vec;

/// Segmented FIFO queue with block recycling (`braid-queue`).
pub use braid_queue as queue;

/// Per-thread accumulator (`braid-combine`).
pub use braid_combine as combine;

pub use braid_combine::Combinable;
pub use braid_core::VecError;
pub use braid_queue::SegQueue;
pub use braid_vec::SegVec;

/// Convenience re-exports of the container types.
pub mod prelude {
    pub use braid_combine::Combinable;
    pub use braid_core::VecError;
    pub use braid_queue::SegQueue;
    pub use braid_vec::SegVec;
}
