//! Boundary-tag ("sentinel") encoding for arena blocks.
//!
//! Every block in the arena is bracketed by two identical sentinels: a
//! little-endian `i32` whose magnitude is the block's payload size in bytes
//! and whose sign is the allocation status (negative = allocated, positive
//! = free). Zero is never a valid sentinel.
//!
//! Raw sentinel values are decoded into [`Tag`] at the read boundary so
//! the allocator algorithms match on variants instead of sign bits.

/// Size of one sentinel in bytes (a little-endian `i32`).
pub const SENTINEL_BYTES: usize = 4;

/// Combined size of the two sentinels bracketing every block.
pub const BLOCK_OVERHEAD: usize = 2 * SENTINEL_BYTES;

/// Decoded state of one block boundary tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    /// The block is free; the payload holds this many reusable bytes.
    Free(u32),
    /// The block is allocated; the payload holds this many caller-owned bytes.
    Allocated(u32),
}

impl Tag {
    /// Decode a raw sentinel. Returns `None` for the illegal value zero.
    pub(crate) fn decode(raw: i32) -> Option<Self> {
        match raw {
            0 => None,
            s if s < 0 => Some(Self::Allocated(s.unsigned_abs())),
            s => Some(Self::Free(s as u32)),
        }
    }

    /// Encode this tag as a raw sentinel value.
    ///
    /// Payload sizes never exceed `i32::MAX` (enforced at pool
    /// construction), so the cast cannot wrap.
    pub(crate) fn encode(self) -> i32 {
        match self {
            Self::Free(size) => size as i32,
            Self::Allocated(size) => -(size as i32),
        }
    }

    /// Payload size in bytes, independent of status.
    pub fn payload(&self) -> usize {
        match *self {
            Self::Free(size) | Self::Allocated(size) => size as usize,
        }
    }

    /// Whether this tag marks a free block.
    pub fn is_free(&self) -> bool {
        matches!(self, Self::Free(_))
    }

    /// Byte distance from this block's leading sentinel to the next
    /// block's leading sentinel.
    pub(crate) fn span(&self) -> usize {
        self.payload() + BLOCK_OVERHEAD
    }
}
