//! Allocator error types.
//!
//! Three distinct kinds, matching who is at fault:
//!
//! - [`AllocError`] — the request cannot be satisfied (construction or
//!   allocation failure). The caller may retry with different parameters.
//! - [`PointerError`] — a handle passed to deallocate/construct/destroy
//!   does not name a live allocated block. The buffer is never mutated
//!   before handle validation completes.
//! - [`AuditError`] — the audit walk found the in-buffer bookkeeping
//!   itself inconsistent. This is an allocator defect, not a caller error.

use std::error::Error;
use std::fmt;

use crate::handle::ArenaId;

/// Errors from pool construction and allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The element type is zero-sized; sentinel bookkeeping is
    /// meaningless when every allocation occupies no bytes.
    ZeroSizedElement,
    /// The requested capacity cannot hold even one minimal block
    /// (one element plus two sentinels).
    ArenaTooSmall {
        /// The capacity that was requested.
        capacity: usize,
        /// The smallest capacity this element type can work with.
        minimum: usize,
    },
    /// The requested capacity is too large for a sentinel's `i32`
    /// magnitude to describe the initial free block.
    CapacityOverflow {
        /// The capacity that was requested.
        capacity: usize,
        /// The largest supported capacity.
        max: usize,
    },
    /// A negative element count was requested.
    NegativeCount {
        /// The offending count.
        count: isize,
    },
    /// `count * size_of::<T>()` overflowed.
    SizeOverflow {
        /// The offending count.
        count: isize,
    },
    /// No free block is large enough for the request.
    CapacityExhausted {
        /// Number of payload bytes requested.
        requested: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSizedElement => {
                write!(f, "cannot build a pool over a zero-sized element type")
            }
            Self::ArenaTooSmall { capacity, minimum } => {
                write!(
                    f,
                    "arena capacity {capacity} is below the minimum viable block of {minimum} bytes"
                )
            }
            Self::CapacityOverflow { capacity, max } => {
                write!(
                    f,
                    "arena capacity {capacity} exceeds the sentinel-addressable maximum of {max} bytes"
                )
            }
            Self::NegativeCount { count } => {
                write!(f, "cannot allocate a negative element count ({count})")
            }
            Self::SizeOverflow { count } => {
                write!(f, "element count {count} overflows the request size")
            }
            Self::CapacityExhausted {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "no free block fits {requested} bytes in a {capacity}-byte arena"
                )
            }
        }
    }
}

impl Error for AllocError {}

/// Errors from resolving a [`BlockPtr`](crate::BlockPtr) against a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerError {
    /// The handle was issued by a different pool.
    ForeignArena {
        /// The arena the handle names.
        pointer: ArenaId,
        /// The arena that was asked to resolve it.
        arena: ArenaId,
    },
    /// The payload offset lies outside the addressable interior of the
    /// buffer.
    OutOfRange {
        /// The handle's payload offset.
        offset: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
    /// The sentinel preceding the payload does not mark an allocated
    /// block (it is zero or positive).
    NotAllocated {
        /// The handle's payload offset.
        offset: usize,
        /// The raw sentinel value found.
        raw: i32,
    },
    /// The trailing sentinel position derived from the leading sentinel
    /// falls outside the buffer.
    TrailerOutOfRange {
        /// The handle's payload offset.
        offset: usize,
        /// The computed trailing sentinel offset.
        trailer: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
    /// The block's two sentinels disagree — corruption, or a handle that
    /// is not aligned to a block boundary.
    SentinelMismatch {
        /// The handle's payload offset.
        offset: usize,
        /// The leading sentinel value.
        leading: i32,
        /// The trailing sentinel value.
        trailing: i32,
    },
    /// The block's payload is too small for the requested element slot.
    PayloadTooSmall {
        /// The handle's payload offset.
        offset: usize,
        /// The block's payload size in bytes.
        payload: usize,
        /// The bytes the element slot requires.
        needed: usize,
    },
}

impl fmt::Display for PointerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForeignArena { pointer, arena } => {
                write!(
                    f,
                    "handle from arena {pointer} cannot be resolved against arena {arena}"
                )
            }
            Self::OutOfRange { offset, capacity } => {
                write!(
                    f,
                    "payload offset {offset} is outside the interior of a {capacity}-byte arena"
                )
            }
            Self::NotAllocated { offset, raw } => {
                write!(
                    f,
                    "sentinel before offset {offset} is {raw}, not an allocated-block marker"
                )
            }
            Self::TrailerOutOfRange {
                offset,
                trailer,
                capacity,
            } => {
                write!(
                    f,
                    "trailing sentinel for offset {offset} would sit at {trailer}, past {capacity} bytes"
                )
            }
            Self::SentinelMismatch {
                offset,
                leading,
                trailing,
            } => {
                write!(
                    f,
                    "sentinels for offset {offset} disagree: leading {leading}, trailing {trailing}"
                )
            }
            Self::PayloadTooSmall {
                offset,
                payload,
                needed,
            } => {
                write!(
                    f,
                    "block at offset {offset} holds {payload} bytes, element slot needs {needed}"
                )
            }
        }
    }
}

impl Error for PointerError {}

/// Structural defects found by the audit walk.
///
/// Any of these means the allocator's own bookkeeping has diverged from
/// the block invariants — a bug in this crate, never a caller error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditError {
    /// A sentinel of value zero was read.
    ZeroSentinel {
        /// Offset of the zero sentinel.
        offset: usize,
    },
    /// A block's trailing sentinel would sit past the end of the buffer.
    TrailerOverrun {
        /// Offset of the block's leading sentinel.
        offset: usize,
        /// The computed trailing sentinel offset.
        trailer: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
    /// A block's two sentinels disagree.
    SentinelMismatch {
        /// Offset of the block's leading sentinel.
        offset: usize,
        /// The leading sentinel value.
        leading: i32,
        /// The trailing sentinel value.
        trailing: i32,
    },
    /// A free block's payload is smaller than one element.
    UndersizedFreeBlock {
        /// Offset of the block's leading sentinel.
        offset: usize,
        /// The free payload size in bytes.
        payload: usize,
        /// The minimum legal free payload (one element).
        minimum: usize,
    },
    /// The walk did not land exactly on the end of the buffer.
    PartitionMismatch {
        /// Where the walk stopped.
        cursor: usize,
        /// Total capacity of the arena in bytes.
        capacity: usize,
    },
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSentinel { offset } => {
                write!(f, "zero sentinel at offset {offset}")
            }
            Self::TrailerOverrun {
                offset,
                trailer,
                capacity,
            } => {
                write!(
                    f,
                    "block at {offset} places its trailing sentinel at {trailer}, past {capacity} bytes"
                )
            }
            Self::SentinelMismatch {
                offset,
                leading,
                trailing,
            } => {
                write!(
                    f,
                    "block at {offset} has mismatched sentinels: leading {leading}, trailing {trailing}"
                )
            }
            Self::UndersizedFreeBlock {
                offset,
                payload,
                minimum,
            } => {
                write!(
                    f,
                    "free block at {offset} holds {payload} bytes, below the {minimum}-byte element minimum"
                )
            }
            Self::PartitionMismatch { cursor, capacity } => {
                write!(
                    f,
                    "block walk stopped at {cursor} instead of partitioning {capacity} bytes"
                )
            }
        }
    }
}

impl Error for AuditError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_error_display_names_the_limits() {
        let err = AllocError::ArenaTooSmall {
            capacity: 10,
            minimum: 12,
        };
        assert_eq!(
            err.to_string(),
            "arena capacity 10 is below the minimum viable block of 12 bytes"
        );
    }

    #[test]
    fn pointer_error_display_names_the_sentinels() {
        let err = PointerError::SentinelMismatch {
            offset: 4,
            leading: -8,
            trailing: -12,
        };
        assert_eq!(
            err.to_string(),
            "sentinels for offset 4 disagree: leading -8, trailing -12"
        );
    }

    #[test]
    fn audit_error_display_names_the_cursor() {
        let err = AuditError::PartitionMismatch {
            cursor: 96,
            capacity: 100,
        };
        assert_eq!(
            err.to_string(),
            "block walk stopped at 96 instead of partitioning 100 bytes"
        );
    }
}
