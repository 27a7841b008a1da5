//! The typed first-fit pool over one arena.
//!
//! [`Pool<T>`] owns a fixed-capacity arena buffer and serves `T`-sized
//! requests out of it: first-fit search on allocate,
//! block splitting when the remainder is worth keeping, and immediate
//! coalescing with free neighbours on deallocate. The system allocator is
//! touched exactly once, when the buffer is created.
//!
//! After every mutating operation the pool re-audits the whole buffer in
//! debug builds; an audit failure is an allocator bug, never a caller
//! error.

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use crate::arena::Arena;
use crate::error::{AllocError, AuditError, PointerError};
use crate::handle::BlockPtr;
use crate::raw;
use crate::sentinel::{Tag, BLOCK_OVERHEAD, SENTINEL_BYTES};

/// A validated allocated block: leading sentinel offset plus payload size.
#[derive(Clone, Copy)]
struct ResolvedBlock {
    start: usize,
    payload: usize,
}

/// Fixed-capacity arena allocator for elements of type `T`.
///
/// The pool hands out [`BlockPtr`] handles into its private byte buffer.
/// Element lifecycle is explicit: [`allocate`](Pool::allocate) reserves
/// uninitialised payload bytes, [`construct`](Pool::construct) places a
/// value, [`destroy`](Pool::destroy) drops one, and
/// [`deallocate`](Pool::deallocate) returns the block to the free list.
/// Dropping the pool releases the buffer without running any element
/// destructors — pairing construct with destroy is the caller's job, as
/// with any allocator interface.
///
/// Two pools of the same element type always compare equal: the allocator
/// is stateless from the container's point of view, so any instance may
/// deallocate what an "equal" instance allocated. The foreign-arena check
/// on handles still enforces, at runtime, that a handle only resolves
/// against the pool that issued it.
pub struct Pool<T> {
    arena: Arena,
    _element: PhantomData<T>,
}

impl<T> Pool<T> {
    /// Create a pool over a fresh buffer of exactly `capacity` bytes.
    ///
    /// The buffer starts as one free block spanning `capacity - 8`
    /// payload bytes. Fails if `T` is zero-sized, if `capacity` cannot
    /// hold one minimal block (one element plus two sentinels), or if
    /// the initial free payload would not fit a sentinel's `i32`.
    pub fn new(capacity: usize) -> Result<Self, AllocError> {
        let element = mem::size_of::<T>();
        if element == 0 {
            return Err(AllocError::ZeroSizedElement);
        }
        let minimum = element + BLOCK_OVERHEAD;
        if capacity < minimum {
            return Err(AllocError::ArenaTooSmall { capacity, minimum });
        }
        let max = i32::MAX as usize + BLOCK_OVERHEAD;
        if capacity > max {
            return Err(AllocError::CapacityOverflow { capacity, max });
        }
        let mut arena = Arena::new(capacity);
        let payload = (capacity - BLOCK_OVERHEAD) as u32;
        arena.write_tag(0, Tag::Free(payload));
        arena.write_tag(capacity - SENTINEL_BYTES, Tag::Free(payload));
        let pool = Self {
            arena,
            _element: PhantomData,
        };
        debug_assert_eq!(pool.audit(), Ok(()));
        Ok(pool)
    }

    /// Allocate a block holding `count` elements.
    ///
    /// `count == 0` is a no-op returning `Ok(None)` without touching the
    /// buffer; a negative count is an allocation failure (the signed
    /// count mirrors the allocator-interface `difference_type`).
    ///
    /// Otherwise this scans blocks left to right and takes the first
    /// free block of at least `count * size_of::<T>()` payload bytes.
    /// If splitting the block would leave a remainder too small to ever
    /// be a legal free block (under one element plus two sentinels), the
    /// whole block is handed to the caller instead — the sentinel then
    /// reports more payload than was asked for.
    ///
    /// The returned handle points at uninitialised payload; place values
    /// with [`construct`](Pool::construct) before reading them back.
    pub fn allocate(&mut self, count: isize) -> Result<Option<BlockPtr>, AllocError> {
        if count < 0 {
            return Err(AllocError::NegativeCount { count });
        }
        if count == 0 {
            return Ok(None);
        }
        let need = (count as usize)
            .checked_mul(mem::size_of::<T>())
            .ok_or(AllocError::SizeOverflow { count })?;
        let capacity = self.arena.capacity();
        let mut cursor = 0;
        while cursor < capacity {
            let Some(tag) = self.arena.tag_at(cursor) else {
                debug_assert!(false, "undecodable sentinel at offset {cursor}");
                break;
            };
            let size = tag.payload();
            if !tag.is_free() || size < need {
                cursor += tag.span();
                continue;
            }
            let leftover = size - need;
            if leftover < mem::size_of::<T>() + BLOCK_OVERHEAD {
                // Absorb the slack: an unusably small remainder must not
                // become a free block, so the caller gets the whole thing.
                self.arena.write_tag(cursor, Tag::Allocated(size as u32));
                self.arena
                    .write_tag(cursor + SENTINEL_BYTES + size, Tag::Allocated(size as u32));
            } else {
                let rest = (leftover - BLOCK_OVERHEAD) as u32;
                self.arena.write_tag(cursor, Tag::Allocated(need as u32));
                self.arena
                    .write_tag(cursor + SENTINEL_BYTES + need, Tag::Allocated(need as u32));
                self.arena
                    .write_tag(cursor + BLOCK_OVERHEAD + need, Tag::Free(rest));
                self.arena
                    .write_tag(cursor + SENTINEL_BYTES + size, Tag::Free(rest));
            }
            debug_assert_eq!(self.audit(), Ok(()));
            return Ok(Some(BlockPtr::new(
                self.arena.id(),
                (cursor + SENTINEL_BYTES) as u32,
            )));
        }
        Err(AllocError::CapacityExhausted {
            requested: need,
            capacity,
        })
    }

    /// Return an allocated block to the free list.
    ///
    /// `count` is accepted for interface compatibility but never trusted:
    /// the block's true size comes from its sentinel. The handle is fully
    /// validated first — foreign arena, range, allocated-marker and
    /// sentinel agreement — and the buffer is not touched if any check
    /// fails.
    ///
    /// Free neighbours on either side are coalesced into the freed block
    /// immediately, so no two adjacent blocks are ever both free. The
    /// freed payload is zeroed, which keeps free space canonical and
    /// erases the interior sentinels absorbed by a merge.
    pub fn deallocate(&mut self, ptr: BlockPtr, count: isize) -> Result<(), PointerError> {
        let _ = count;
        let block = self.resolve_allocated(ptr)?;
        let capacity = self.arena.capacity();
        let start = block.start;
        let trailer = start + SENTINEL_BYTES + block.payload;
        let end = trailer + SENTINEL_BYTES;

        // A free left neighbour exposes its trailing sentinel directly
        // before our leading one; a free right neighbour exposes its
        // leading sentinel directly after our trailing one.
        let left = if start >= SENTINEL_BYTES {
            match self.arena.tag_at(start - SENTINEL_BYTES) {
                Some(Tag::Free(size)) => Some(size as usize),
                _ => None,
            }
        } else {
            None
        };
        let right = if end < capacity {
            match self.arena.tag_at(end) {
                Some(Tag::Free(size)) => Some(size as usize),
                _ => None,
            }
        } else {
            None
        };

        let (new_start, merged) = match (left, right) {
            (Some(ls), Some(rs)) => (
                start - BLOCK_OVERHEAD - ls,
                ls + block.payload + rs + 2 * BLOCK_OVERHEAD,
            ),
            (Some(ls), None) => (start - BLOCK_OVERHEAD - ls, ls + block.payload + BLOCK_OVERHEAD),
            (None, Some(rs)) => (start, block.payload + rs + BLOCK_OVERHEAD),
            (None, None) => (start, block.payload),
        };
        let new_trailer = new_start + SENTINEL_BYTES + merged;
        self.arena.write_tag(new_start, Tag::Free(merged as u32));
        self.arena.write_tag(new_trailer, Tag::Free(merged as u32));
        self.arena.zero_range(new_start + SENTINEL_BYTES, new_trailer);
        debug_assert_eq!(self.audit(), Ok(()));
        Ok(())
    }

    /// Place `value` into element slot `index` of an allocated block.
    ///
    /// The handle is validated like [`deallocate`](Pool::deallocate),
    /// plus a check that slot `index` fits inside the block's payload.
    /// Whatever bytes the slot held before are overwritten without a
    /// destructor running.
    pub fn construct(&mut self, ptr: BlockPtr, index: usize, value: T) -> Result<(), PointerError> {
        let (offset, len) = self.element_slot(ptr, index)?;
        raw::write_value(self.arena.payload_mut(offset, len), value);
        debug_assert_eq!(self.audit(), Ok(()));
        Ok(())
    }

    /// Drop the element in slot `index` of an allocated block.
    ///
    /// The slot's bytes are left in place; only the destructor runs.
    ///
    /// # Safety
    ///
    /// Slot `index` must hold a live `T` previously placed by
    /// [`construct`](Pool::construct) and not destroyed since. The pool
    /// does not track element liveness.
    #[allow(unsafe_code)]
    pub unsafe fn destroy(&mut self, ptr: BlockPtr, index: usize) -> Result<(), PointerError> {
        let (offset, len) = self.element_slot(ptr, index)?;
        // SAFETY: the slot geometry was just validated and the caller
        // guarantees a live `T` at this slot.
        let value = unsafe { raw::read_value::<T>(self.arena.payload(offset, len)) };
        drop(value);
        debug_assert_eq!(self.audit(), Ok(()));
        Ok(())
    }

    /// Copy the element out of slot `index` of an allocated block.
    ///
    /// Diagnostic accessor used by tests and embedders.
    ///
    /// # Safety
    ///
    /// Slot `index` must hold a live `T` previously placed by
    /// [`construct`](Pool::construct); allocated payloads start out
    /// uninitialised.
    #[allow(unsafe_code)]
    pub unsafe fn read(&self, ptr: BlockPtr, index: usize) -> Result<T, PointerError>
    where
        T: Copy,
    {
        let (offset, len) = self.element_slot(ptr, index)?;
        // SAFETY: slot geometry validated; `T: Copy` means the bitwise
        // copy does not take ownership away from the slot.
        Ok(unsafe { raw::read_value::<T>(self.arena.payload(offset, len)) })
    }

    /// Run the structural audit over the whole buffer.
    ///
    /// Verifies the invariants of the block partition: nonzero sentinels,
    /// pairwise-identical sentinels, free payloads of at least one
    /// element, and a walk that lands exactly on the capacity. An error
    /// here means the allocator itself is defective.
    pub fn audit(&self) -> Result<(), AuditError> {
        self.arena.audit(mem::size_of::<T>())
    }

    /// Total capacity of the arena in bytes, sentinels included.
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Sum of all free payload bytes.
    ///
    /// Not all of it is reachable by one allocation: each free block pays
    /// its own sentinel overhead and fragmentation may scatter the total.
    pub fn free_bytes(&self) -> usize {
        self.arena
            .blocks()
            .filter(|(_, tag)| tag.is_free())
            .map(|(_, tag)| tag.payload())
            .sum()
    }

    /// Payload size of the largest free block, or zero if none is free.
    pub fn largest_free(&self) -> usize {
        self.arena
            .blocks()
            .filter(|(_, tag)| tag.is_free())
            .map(|(_, tag)| tag.payload())
            .max()
            .unwrap_or(0)
    }

    /// Number of blocks (free and allocated) in the partition.
    pub fn block_count(&self) -> usize {
        self.arena.blocks().count()
    }

    /// Raw view of the whole buffer, for diagnostics and byte-level tests.
    pub fn as_bytes(&self) -> &[u8] {
        self.arena.as_bytes()
    }

    /// Raw sentinel value at a byte offset, or `None` if out of bounds.
    ///
    /// Diagnostic view into the boundary-tag encoding; offsets are only
    /// meaningful at block boundaries.
    pub fn sentinel_at(&self, offset: usize) -> Option<i32> {
        self.arena.raw_at(offset)
    }

    /// Forge a handle at an arbitrary payload offset.
    ///
    /// For tests and diagnostics: the result is treated exactly like a
    /// handle returned by [`allocate`](Pool::allocate) and goes through
    /// full validation on use.
    pub fn handle_at(&self, offset: u32) -> BlockPtr {
        BlockPtr::new(self.arena.id(), offset)
    }

    /// Validate a handle down to its allocated block.
    ///
    /// Checks, in order: issuing arena, payload offset inside the buffer
    /// interior, a negative leading sentinel, an in-bounds trailing
    /// sentinel position, and bit-identical sentinels.
    fn resolve_allocated(&self, ptr: BlockPtr) -> Result<ResolvedBlock, PointerError> {
        if ptr.arena() != self.arena.id() {
            return Err(PointerError::ForeignArena {
                pointer: ptr.arena(),
                arena: self.arena.id(),
            });
        }
        let offset = ptr.offset() as usize;
        let capacity = self.arena.capacity();
        if offset < SENTINEL_BYTES || offset >= capacity - SENTINEL_BYTES {
            return Err(PointerError::OutOfRange { offset, capacity });
        }
        // In range, so the leading sentinel view is always readable.
        let leading = self
            .arena
            .raw_at(offset - SENTINEL_BYTES)
            .ok_or(PointerError::OutOfRange { offset, capacity })?;
        if leading >= 0 {
            return Err(PointerError::NotAllocated {
                offset,
                raw: leading,
            });
        }
        let payload = leading.unsigned_abs() as usize;
        let trailer = offset
            .checked_add(payload)
            .ok_or(PointerError::TrailerOutOfRange {
                offset,
                trailer: usize::MAX,
                capacity,
            })?;
        let trailing = self
            .arena
            .raw_at(trailer)
            .ok_or(PointerError::TrailerOutOfRange {
                offset,
                trailer,
                capacity,
            })?;
        if trailing != leading {
            return Err(PointerError::SentinelMismatch {
                offset,
                leading,
                trailing,
            });
        }
        Ok(ResolvedBlock {
            start: offset - SENTINEL_BYTES,
            payload,
        })
    }

    /// Resolve `(ptr, index)` to the byte range of one element slot.
    fn element_slot(&self, ptr: BlockPtr, index: usize) -> Result<(usize, usize), PointerError> {
        let block = self.resolve_allocated(ptr)?;
        let element = mem::size_of::<T>();
        let needed = index
            .checked_add(1)
            .and_then(|slots| slots.checked_mul(element))
            .ok_or(PointerError::PayloadTooSmall {
                offset: ptr.offset() as usize,
                payload: block.payload,
                needed: usize::MAX,
            })?;
        if block.payload < needed {
            return Err(PointerError::PayloadTooSmall {
                offset: ptr.offset() as usize,
                payload: block.payload,
                needed,
            });
        }
        Ok((block.start + SENTINEL_BYTES + index * element, element))
    }
}

impl<T> fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("capacity", &self.capacity())
            .field("blocks", &self.block_count())
            .field("free_bytes", &self.free_bytes())
            .finish()
    }
}

/// Stateless equality: any two pools of the same element type are
/// interchangeable from the container's point of view.
impl<T> PartialEq for Pool<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> Eq for Pool<T> {}
