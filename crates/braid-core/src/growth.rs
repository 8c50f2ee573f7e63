//! Geometric growth policy shared by the segmented containers.
//!
//! Both the vector and the queue grow by appending a fixed-capacity
//! storage block to a chain; existing blocks are never moved. The
//! policy here decides how large each appended block is: total capacity
//! follows a 1.5× geometric curve, and each block is floored at a
//! per-type minimum so that small elements do not produce tiny blocks
//! while large elements do not produce enormous ones.

use crate::error::VecError;

/// Maximum representable logical size for any braid container.
///
/// Slices cannot exceed `isize::MAX` elements, so this is the hard
/// ceiling for capacity arithmetic.
pub const MAX_CAPACITY: usize = isize::MAX as usize;

/// Minimum capacity of a newly appended segment, by element size class.
///
/// Larger elements get smaller minimum segments to bound the byte
/// footprint of a single block: 8 slots at ≥32 bytes, 16 slots at
/// ≥16 bytes, 32 slots otherwise (roughly 1KB either way).
pub const fn min_segment_len<T>() -> usize {
    if std::mem::size_of::<T>() >= 32 {
        8
    } else if std::mem::size_of::<T>() >= 16 {
        16
    } else {
        32
    }
}

/// Geometrically grown total capacity: `max(current × 1.5, requested)`,
/// clamped at [`MAX_CAPACITY`] when the 1.5× step would overflow.
pub fn grown_capacity(current: usize, requested: usize) -> usize {
    if current > MAX_CAPACITY - current / 2 {
        return MAX_CAPACITY;
    }
    let geometric = current + current / 2;
    geometric.max(requested)
}

/// Capacity of the next segment to append so that total capacity reaches
/// `grown_capacity(current_capacity, requested_total)`.
///
/// Floored at [`min_segment_len`] for `T`. Existing segments are never
/// resized; the returned length is the single new block's capacity.
pub fn next_segment_len<T>(current_capacity: usize, requested_total: usize) -> usize {
    let target = grown_capacity(current_capacity, requested_total);
    min_segment_len::<T>().max(target - current_capacity)
}

/// Validate a requested logical size against [`MAX_CAPACITY`].
pub fn checked_size(requested: usize) -> Result<usize, VecError> {
    if requested > MAX_CAPACITY {
        return Err(VecError::CapacityOverflow { requested });
    }
    Ok(requested)
}

/// Compute `len + additional` with overflow reported as
/// [`VecError::CapacityOverflow`].
pub fn checked_add_size(len: usize, additional: usize) -> Result<usize, VecError> {
    match len.checked_add(additional) {
        Some(n) if n <= MAX_CAPACITY => Ok(n),
        _ => Err(VecError::CapacityOverflow {
            requested: len.saturating_add(additional),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_segment_len_by_size_class() {
        assert_eq!(min_segment_len::<u8>(), 32);
        assert_eq!(min_segment_len::<u64>(), 32);
        assert_eq!(min_segment_len::<[u8; 16]>(), 16);
        assert_eq!(min_segment_len::<[u8; 31]>(), 16);
        assert_eq!(min_segment_len::<[u8; 32]>(), 8);
        assert_eq!(min_segment_len::<[u8; 100]>(), 8);
    }

    #[test]
    fn grown_capacity_is_geometric() {
        assert_eq!(grown_capacity(32, 33), 48);
        assert_eq!(grown_capacity(48, 49), 72);
    }

    #[test]
    fn grown_capacity_honours_large_requests() {
        // A request past the 1.5× curve wins.
        assert_eq!(grown_capacity(32, 1000), 1000);
    }

    #[test]
    fn grown_capacity_clamps_at_max() {
        assert_eq!(grown_capacity(MAX_CAPACITY, MAX_CAPACITY), MAX_CAPACITY);
        assert_eq!(grown_capacity(MAX_CAPACITY - 1, MAX_CAPACITY), MAX_CAPACITY);
    }

    #[test]
    fn next_segment_len_floors_at_minimum() {
        // Growing an empty chain by one element still yields a full
        // minimum-size segment.
        assert_eq!(next_segment_len::<u64>(0, 1), 32);
        assert_eq!(next_segment_len::<[u8; 64]>(0, 1), 8);
    }

    #[test]
    fn next_segment_len_covers_the_request() {
        let current = 32;
        let requested = 500;
        let appended = next_segment_len::<u32>(current, requested);
        assert!(current + appended >= requested);
    }

    #[test]
    fn checked_size_rejects_past_max() {
        assert!(checked_size(MAX_CAPACITY).is_ok());
        assert!(checked_size(MAX_CAPACITY + 1).is_err());
    }

    #[test]
    fn checked_add_size_reports_overflow() {
        assert_eq!(checked_add_size(3, 4), Ok(7));
        assert!(matches!(
            checked_add_size(usize::MAX, 1),
            Err(VecError::CapacityOverflow { .. })
        ));
        assert!(matches!(
            checked_add_size(MAX_CAPACITY, 1),
            Err(VecError::CapacityOverflow { .. })
        ));
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn grown_capacity_never_shrinks(
                current in 0usize..1 << 40,
                requested in 0usize..1 << 40,
            ) {
                let grown = grown_capacity(current, requested);
                prop_assert!(grown >= current);
                prop_assert!(grown >= requested.min(MAX_CAPACITY));
            }

            #[test]
            fn next_segment_always_reaches_requested_total(
                current in 0usize..1 << 32,
                extra in 1usize..1 << 16,
            ) {
                let requested = current + extra;
                let appended = next_segment_len::<u32>(current, requested);
                prop_assert!(current + appended >= requested);
                prop_assert!(appended >= min_segment_len::<u32>());
            }
        }
    }
}
