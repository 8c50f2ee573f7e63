//! Shared infrastructure for the braid container crates.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the error types and the geometric growth policy shared by the
//! segmented vector and the segmented queue.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod growth;

pub use error::VecError;
pub use growth::{checked_size, grown_capacity, min_segment_len, next_segment_len};
