//! Fixed-capacity arena allocator with boundary-tag block tracking.
//!
//! A [`Pool<T>`] owns one fixed-size byte buffer and serves every request
//! out of it — the system allocator is called exactly once, when the pool
//! is created. Block metadata lives entirely inside the buffer as pairs
//! of boundary "sentinels"; there is no side table.
//!
//! # Buffer layout
//!
//! ```text
//! ┌────────┬───────────────┬────────┬────────┬─────────────┬────────┐
//! │  -12   │  12 payload   │  -12   │   72   │  72 payload │   72   │
//! │ (lead) │    bytes      │ (trail)│ (lead) │    bytes    │ (trail)│
//! └────────┴───────────────┴────────┴────────┴─────────────┴────────┘
//!   allocated block                   free block
//! ```
//!
//! Each sentinel is a little-endian `i32`: magnitude = payload bytes,
//! sign = status (negative = allocated, positive = free, zero = never
//! valid). The two sentinels of a block are always bit-identical, which
//! lets deallocation re-derive block geometry from a payload handle and
//! lets coalescing inspect a left neighbour by reading the sentinel
//! directly before a block's own.
//!
//! # Operations
//!
//! - [`Pool::allocate`] — first-fit scan; splits the chosen free block
//!   unless the remainder would be too small to ever be legal, in which
//!   case the caller absorbs the slack.
//! - [`Pool::deallocate`] — validates the handle against the sentinels,
//!   then coalesces with free neighbours immediately: no two adjacent
//!   blocks are ever both free.
//! - [`Pool::construct`] / [`Pool::destroy`] — explicit element
//!   lifecycle inside allocated payloads.
//! - [`Pool::audit`] — walks the whole partition and verifies the
//!   structural invariants; re-run automatically (in debug builds) after
//!   every mutation.
//!
//! # Safety
//!
//! Sentinels are accessed through bounds-checked integer views, never by
//! reinterpreting pointers. `unsafe` is confined to `raw.rs`, which moves
//! element values in and out of validated payload byte ranges with
//! unaligned reads and writes, plus the two `unsafe`-declared lifecycle
//! accessors ([`Pool::destroy`], [`Pool::read`]) whose contract is that
//! the addressed slot holds a live element.
//!
//! The pool is single-threaded by design: no internal locking, no
//! sharing of one arena across pools.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod arena;
pub mod error;
pub mod handle;
pub mod pool;
mod raw;
pub mod sentinel;

// Public re-exports for the primary API surface.
pub use error::{AllocError, AuditError, PointerError};
pub use handle::{ArenaId, BlockPtr};
pub use pool::Pool;
pub use sentinel::{Tag, BLOCK_OVERHEAD, SENTINEL_BYTES};
