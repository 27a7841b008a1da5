//! Low-level element moves between payload bytes and typed values.
//!
//! The home for the crate's bounded `unsafe`: exactly two functions,
//! both operating on byte slices that the pool has already validated
//! against the block geometry. The arena is a byte buffer with
//! alignment 1, so every access is unaligned by construction.

#![allow(unsafe_code)]

use std::mem;
use std::ptr;

/// Move `value` into the front of `dst`.
///
/// Any previous bytes are overwritten without running a destructor, the
/// same as placement construction over uninitialised storage.
///
/// # Panics
///
/// Panics if `dst` is shorter than `size_of::<T>()`.
pub(crate) fn write_value<T>(dst: &mut [u8], value: T) {
    assert!(dst.len() >= mem::size_of::<T>());
    // SAFETY: `dst` is valid for `size_of::<T>()` bytes of writes (length
    // asserted above) and `write_unaligned` has no alignment requirement.
    unsafe { ptr::write_unaligned(dst.as_mut_ptr().cast::<T>(), value) };
}

/// Move the `T` at the front of `src` out by bitwise copy.
///
/// # Safety
///
/// The first `size_of::<T>()` bytes of `src` must hold a live, valid `T`
/// (previously placed by [`write_value`]), and the caller takes ownership
/// of it — the bytes left behind must not be read as a `T` again unless
/// `T: Copy`.
///
/// # Panics
///
/// Panics if `src` is shorter than `size_of::<T>()`.
pub(crate) unsafe fn read_value<T>(src: &[u8]) -> T {
    assert!(src.len() >= mem::size_of::<T>());
    // SAFETY: `src` is valid for `size_of::<T>()` bytes of reads (length
    // asserted above), holds a valid `T` per the caller's contract, and
    // `read_unaligned` has no alignment requirement.
    unsafe { ptr::read_unaligned(src.as_ptr().cast::<T>()) }
}
