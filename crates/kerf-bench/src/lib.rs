//! Benchmark workloads for the kerf arena allocator.
//!
//! Provides pre-built pool states for the benches:
//!
//! - [`fresh_pool`]: one free block spanning the whole arena
//! - [`fragmented_pool`]: alternating allocated/free blocks, so first-fit
//!   scans have to walk past real fragmentation

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use kerf::{BlockPtr, Pool};

/// Element type used by all benchmark workloads.
pub type Elem = u64;

/// A pool over a fresh arena of `capacity` bytes.
pub fn fresh_pool(capacity: usize) -> Pool<Elem> {
    Pool::new(capacity).expect("benchmark capacity is valid")
}

/// Fill a pool with `count`-element blocks, then free every other one.
///
/// Returns the pool and the handles still held, leaving a partition of
/// alternating allocated and free blocks. First-fit requests larger than
/// the holes must scan past all of them.
pub fn fragmented_pool(capacity: usize, count: isize) -> (Pool<Elem>, Vec<BlockPtr>) {
    let mut pool = fresh_pool(capacity);
    let mut held = Vec::new();
    while let Ok(Some(ptr)) = pool.allocate(count) {
        held.push(ptr);
    }
    let mut kept = Vec::new();
    for (i, ptr) in held.into_iter().enumerate() {
        if i % 2 == 0 {
            kept.push(ptr);
        } else {
            pool.deallocate(ptr, count).expect("held handle is valid");
        }
    }
    (pool, kept)
}
