//! Error types for the braid containers.
//!
//! Allocation failure is deliberately absent: the containers allocate
//! through `Box`/`Vec`, and a failed allocation aborts the process.
//! The recoverable conditions are index and size-arithmetic errors.

use std::error::Error;
use std::fmt;

/// Errors from checked segmented-vector operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VecError {
    /// A checked element access with an index past the logical size.
    IndexOutOfBounds {
        /// The requested index.
        index: usize,
        /// The logical size at the time of the call.
        len: usize,
    },
    /// A requested logical size or capacity exceeds the representable
    /// maximum for the index type.
    CapacityOverflow {
        /// The requested size that overflowed.
        requested: usize,
    },
}

impl fmt::Display for VecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::CapacityOverflow { requested } => {
                write!(f, "requested size {requested} overflows the maximum capacity")
            }
        }
    }
}

impl Error for VecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_index_and_len() {
        let e = VecError::IndexOutOfBounds { index: 9, len: 4 };
        assert_eq!(e.to_string(), "index 9 out of bounds for length 4");
    }

    #[test]
    fn display_includes_requested_size() {
        let e = VecError::CapacityOverflow { requested: usize::MAX };
        assert!(e.to_string().contains(&usize::MAX.to_string()));
    }
}
