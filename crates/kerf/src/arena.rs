//! The raw arena buffer and its checked sentinel views.
//!
//! [`Arena`] owns the fixed byte buffer and is the only code that touches
//! it. Sentinels are read and written through bounds-checked little-endian
//! `i32` views over 4-byte ranges — never by reinterpreting pointers — so
//! a malformed offset surfaces as `None` instead of undefined behaviour.
//!
//! The audit walk lives here too: it re-derives the block partition from
//! offset 0 and confirms every structural invariant the allocator is
//! supposed to maintain.

use crate::error::AuditError;
use crate::handle::ArenaId;
use crate::sentinel::{Tag, SENTINEL_BYTES};

/// A fixed-capacity byte buffer partitioned into sentinel-bracketed blocks.
///
/// The buffer is allocated once at construction and never grows. All block
/// metadata lives inside it; there is no side table.
pub(crate) struct Arena {
    id: ArenaId,
    bytes: Vec<u8>,
}

impl Arena {
    /// Create a zero-filled arena of exactly `capacity` bytes.
    ///
    /// The caller is responsible for writing the initial free-block
    /// sentinels; a fresh arena does not yet satisfy the audit.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            id: ArenaId::next(),
            bytes: vec![0; capacity],
        }
    }

    pub(crate) fn id(&self) -> ArenaId {
        self.id
    }

    pub(crate) fn capacity(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read the raw `i32` at `offset`, or `None` if the 4-byte view does
    /// not fit inside the buffer.
    pub(crate) fn raw_at(&self, offset: usize) -> Option<i32> {
        let end = offset.checked_add(SENTINEL_BYTES)?;
        let view: [u8; SENTINEL_BYTES] = self.bytes.get(offset..end)?.try_into().ok()?;
        Some(i32::from_le_bytes(view))
    }

    /// Read and decode the sentinel at `offset`.
    ///
    /// `None` if the view is out of bounds or the sentinel is zero.
    pub(crate) fn tag_at(&self, offset: usize) -> Option<Tag> {
        Tag::decode(self.raw_at(offset)?)
    }

    /// Write a sentinel at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the 4-byte view does not fit inside the buffer. Write
    /// offsets are always derived from validated block geometry, so an
    /// out-of-bounds write is an allocator bug.
    pub(crate) fn write_tag(&mut self, offset: usize, tag: Tag) {
        self.bytes[offset..offset + SENTINEL_BYTES].copy_from_slice(&tag.encode().to_le_bytes());
    }

    /// Zero the bytes in `[start, end)`.
    ///
    /// Deallocation zeroes the payload of every block it frees, which
    /// keeps free space in a canonical all-zero state (and erases the
    /// interior sentinels absorbed by coalescing).
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit inside the buffer.
    pub(crate) fn zero_range(&mut self, start: usize, end: usize) {
        self.bytes[start..end].fill(0);
    }

    /// Shared view of `len` payload bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit inside the buffer.
    pub(crate) fn payload(&self, offset: usize, len: usize) -> &[u8] {
        &self.bytes[offset..offset + len]
    }

    /// Mutable view of `len` payload bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit inside the buffer.
    pub(crate) fn payload_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.bytes[offset..offset + len]
    }

    /// Iterate the block partition as `(leading sentinel offset, tag)`.
    ///
    /// Stops early if a sentinel fails to decode; the audit is the place
    /// that turns such a stop into an error.
    pub(crate) fn blocks(&self) -> Blocks<'_> {
        Blocks {
            arena: self,
            cursor: 0,
        }
    }

    /// Walk the buffer and verify the structural invariants.
    ///
    /// From offset 0: every sentinel must be nonzero, every block's two
    /// sentinels must be bit-identical, every free payload must hold at
    /// least `min_free_payload` bytes (one element), and the walk must
    /// land exactly on the end of the buffer.
    pub(crate) fn audit(&self, min_free_payload: usize) -> Result<(), AuditError> {
        let capacity = self.capacity();
        let mut cursor = 0;
        while cursor < capacity {
            let raw = self
                .raw_at(cursor)
                .ok_or(AuditError::PartitionMismatch { cursor, capacity })?;
            let tag = Tag::decode(raw).ok_or(AuditError::ZeroSentinel { offset: cursor })?;
            if let Tag::Free(size) = tag {
                if (size as usize) < min_free_payload {
                    return Err(AuditError::UndersizedFreeBlock {
                        offset: cursor,
                        payload: size as usize,
                        minimum: min_free_payload,
                    });
                }
            }
            let trailer = cursor
                .checked_add(SENTINEL_BYTES + tag.payload())
                .ok_or(AuditError::TrailerOverrun {
                    offset: cursor,
                    trailer: usize::MAX,
                    capacity,
                })?;
            let trailing = self.raw_at(trailer).ok_or(AuditError::TrailerOverrun {
                offset: cursor,
                trailer,
                capacity,
            })?;
            if trailing != raw {
                return Err(AuditError::SentinelMismatch {
                    offset: cursor,
                    leading: raw,
                    trailing,
                });
            }
            cursor = trailer + SENTINEL_BYTES;
        }
        if cursor == capacity {
            Ok(())
        } else {
            Err(AuditError::PartitionMismatch { cursor, capacity })
        }
    }
}

/// Iterator over the arena's block partition.
pub(crate) struct Blocks<'a> {
    arena: &'a Arena,
    cursor: usize,
}

impl Iterator for Blocks<'_> {
    type Item = (usize, Tag);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.arena.capacity() {
            return None;
        }
        let tag = self.arena.tag_at(self.cursor)?;
        let at = self.cursor;
        self.cursor += tag.span();
        Some((at, tag))
    }
}
