//! Page-locked, wipe-on-drop storage for long-lived secrets.
//!
//! [`SecretBox`] heap-allocates its contents and asks the OS to pin the
//! backing pages in physical memory so they cannot be swapped out. Locking is
//! best-effort: it can fail under `RLIMIT_MEMLOCK` or on platforms without
//! the capability, and the box keeps working either way — the outcome is
//! queryable through [`SecretBox::is_locked`]. On drop the contents are
//! zeroized and the pages unlocked.

use core::fmt;
use core::mem;
use core::ops::{Deref, DerefMut};

use cfg_if::cfg_if;
use zeroize::Zeroize;

/// Heap storage for secret material: page-locked while alive, zeroized on
/// drop.
pub struct SecretBox<T: Zeroize> {
    value: Box<T>,
    locked: bool,
}

impl<T: Zeroize> SecretBox<T> {
    /// Move `value` to the heap and attempt to lock its pages.
    pub fn new(value: T) -> Self {
        let mut value = Box::new(value);
        let ptr: *mut T = &mut *value;
        let locked = lock_region(ptr.cast(), mem::size_of::<T>());
        Self { value, locked }
    }

    /// Whether the backing pages are pinned in physical memory.
    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl<T: Zeroize> Deref for SecretBox<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Zeroize> DerefMut for SecretBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Zeroize> Drop for SecretBox<T> {
    fn drop(&mut self) {
        self.value.zeroize();
        if self.locked {
            let ptr: *mut T = &mut *self.value;
            unlock_region(ptr.cast(), mem::size_of::<T>());
        }
    }
}

impl<T: Zeroize> fmt::Debug for SecretBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBox {{ [redacted] }}")
    }
}

cfg_if! {
    if #[cfg(unix)] {
        fn lock_region(ptr: *mut u8, len: usize) -> bool {
            if len == 0 {
                return false;
            }
            unsafe { libc::mlock(ptr as *const libc::c_void, len) == 0 }
        }

        fn unlock_region(ptr: *mut u8, len: usize) {
            unsafe {
                libc::munlock(ptr as *const libc::c_void, len);
            }
        }
    } else {
        fn lock_region(_ptr: *mut u8, _len: usize) -> bool {
            false
        }

        fn unlock_region(_ptr: *mut u8, _len: usize) {}
    }
}
