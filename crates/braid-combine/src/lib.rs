//! Per-thread value accumulation.
//!
//! [`Combinable`] gives every thread its own private copy of a value.
//! Threads update their copy through [`Combinable::local`] without
//! contending with each other; once the parallel phase is over, the
//! owner folds all copies into one result with [`Combinable::combine`].
//!
//! # Architecture
//!
//! ```text
//! Combinable<T>
//! └── Box<[AtomicPtr<Entry<T>>]>     fixed bucket table
//!     └── Entry ─▶ Entry ─▶ …        per-bucket chain, CAS-prepended
//!         (ThreadId, T)
//! ```
//!
//! Thread ids hash into a fixed bucket table; each bucket heads a
//! linked chain of entries. Lookup walks the chain for the calling
//! thread's id; a miss prepends a fresh default-constructed entry with
//! a compare-and-swap retry loop, so concurrent first calls from
//! threads sharing a bucket all land safely.
//!
//! # Operation categories
//!
//! [`Combinable::local`] and [`Combinable::local_tracked`] take `&self`
//! and are safe from any number of threads; each thread only ever
//! observes its own entry. [`Combinable::combine`],
//! [`Combinable::combine_each`] and [`Combinable::clear`] visit every
//! thread's entry and therefore take `&mut self`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod combine;

pub use combine::Combinable;
