//! Payload handles and arena instance identifiers.
//!
//! A [`BlockPtr`] is the opaque "pointer" returned by allocation: the id of
//! the arena it points into plus the byte offset of the block's payload.
//! Carrying the arena id lets every operation reject handles from a foreign
//! pool outright instead of attempting bounds arithmetic across unrelated
//! buffers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`ArenaId`] allocation.
static ARENA_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for an arena buffer.
///
/// Allocated from a monotonic atomic counter via [`ArenaId::next`]. Two
/// distinct pools always have different ids, even if their buffers have
/// identical contents, so a handle can never be mistakenly resolved
/// against a pool that did not issue it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArenaId(u64);

impl ArenaId {
    /// Allocate a fresh, unique arena id.
    ///
    /// Each call returns an id that has never been returned before within
    /// this process. Thread-safe.
    pub(crate) fn next() -> Self {
        Self(ARENA_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle to an allocated block's payload.
///
/// Returned by [`Pool::allocate`](crate::Pool::allocate); the `offset` is
/// the byte position of the payload start, immediately after the block's
/// leading sentinel. Handles are plain data: copying one does not extend
/// the block's lifetime, and a handle whose block has been deallocated is
/// rejected by the sentinel checks on its next use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct BlockPtr {
    /// The pool that issued this handle.
    pub(crate) arena: ArenaId,
    /// Byte offset of the payload start within the arena buffer.
    pub(crate) offset: u32,
}

impl BlockPtr {
    /// Create a new handle.
    pub(crate) fn new(arena: ArenaId, offset: u32) -> Self {
        Self { arena, offset }
    }

    /// The id of the pool that issued this handle.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Byte offset of the payload start within the arena buffer.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Displace this handle by a signed number of bytes.
    ///
    /// Mirrors raw pointer arithmetic for diagnostics and tests. The
    /// result still names the same arena but may not point at a payload
    /// boundary; such handles are rejected with a
    /// [`PointerError`](crate::error::PointerError) when used.
    pub fn offset_by(self, bytes: isize) -> Self {
        Self {
            arena: self.arena,
            offset: (i64::from(self.offset) + bytes as i64) as u32,
        }
    }
}

impl fmt::Display for BlockPtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockPtr(arena={}, off={})", self.arena, self.offset)
    }
}
