//! Lock ordering for two-instance operations.
//!
//! `merge` writes the receiver while reading the other replica. Two threads
//! running `a.merge(&b)` and `b.merge(&a)` would deadlock if each took its
//! own receiver first, so both guards are always taken in address order.

use core::ptr;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Exclusive guard on `dst` plus shared guard on `src`, acquired lower
/// address first. `None` when both are the same lock.
pub(crate) fn write_read<'a, T>(
    dst: &'a RwLock<T>,
    src: &'a RwLock<T>,
) -> Option<(RwLockWriteGuard<'a, T>, RwLockReadGuard<'a, T>)> {
    if ptr::eq(dst, src) {
        return None;
    }
    if (dst as *const RwLock<T>) < (src as *const RwLock<T>) {
        let w = dst.write();
        let r = src.read();
        Some((w, r))
    } else {
        let r = src.read();
        let w = dst.write();
        Some((w, r))
    }
}

/// Shared guards on both locks, acquired lower address first. `None` when
/// both are the same lock.
pub(crate) fn read_read<'a, T>(
    a: &'a RwLock<T>,
    b: &'a RwLock<T>,
) -> Option<(RwLockReadGuard<'a, T>, RwLockReadGuard<'a, T>)> {
    if ptr::eq(a, b) {
        return None;
    }
    if (a as *const RwLock<T>) < (b as *const RwLock<T>) {
        let ga = a.read();
        let gb = b.read();
        Some((ga, gb))
    } else {
        let gb = b.read();
        let ga = a.read();
        Some((ga, gb))
    }
}
