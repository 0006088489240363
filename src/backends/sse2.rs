//! 128-bit keystream XOR using SSE2 intrinsics.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::soft;

/// # Safety
///
/// The caller must ensure SSE2 is available on the executing CPU.
#[target_feature(enable = "sse2")]
pub(crate) unsafe fn xor_keystream(out: &mut [u8], keystream: &[u8]) {
    debug_assert!(out.len() <= keystream.len());

    let mut offset = 0;
    while out.len() - offset >= 16 {
        let out_ptr = out.as_mut_ptr().add(offset) as *mut __m128i;
        let ks_ptr = keystream.as_ptr().add(offset) as *const __m128i;
        _mm_storeu_si128(
            out_ptr,
            _mm_xor_si128(_mm_loadu_si128(out_ptr as *const __m128i), _mm_loadu_si128(ks_ptr)),
        );
        offset += 16;
    }

    soft::xor_keystream(&mut out[offset..], &keystream[offset..]);
}
