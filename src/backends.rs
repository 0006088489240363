//! Keystream-XOR backend selection.
//!
//! The block function is scalar; the XOR of keystream against the data
//! buffer is where throughput is won, so that step is dispatched to the
//! widest kernel the CPU supports. Build with `RUSTFLAGS="--cfg
//! chacha_force_soft"` to pin the portable kernel.

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(chacha_force_soft)] {
        pub(crate) mod soft;
    } else if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        pub(crate) mod soft;
        pub(crate) mod sse2;
        pub(crate) mod avx2;
    } else {
        pub(crate) mod soft;
    }
}

cfg_if! {
    if #[cfg(chacha_force_soft)] {
        pub(crate) type Tokens = ();

        pub(crate) fn init_tokens() -> Tokens {}

        pub(crate) fn xor_keystream(out: &mut [u8], keystream: &[u8], _tokens: Tokens) {
            soft::xor_keystream(out, keystream);
        }
    } else if #[cfg(any(target_arch = "x86", target_arch = "x86_64"))] {
        cpufeatures::new!(avx2_cpuid, "avx2");
        cpufeatures::new!(sse2_cpuid, "sse2");

        pub(crate) type Tokens = (avx2_cpuid::InitToken, sse2_cpuid::InitToken);

        pub(crate) fn init_tokens() -> Tokens {
            (avx2_cpuid::init(), sse2_cpuid::init())
        }

        pub(crate) fn xor_keystream(out: &mut [u8], keystream: &[u8], tokens: Tokens) {
            let (avx2_token, sse2_token) = tokens;
            if avx2_token.get() {
                unsafe { avx2::xor_keystream(out, keystream) }
            } else if sse2_token.get() {
                unsafe { sse2::xor_keystream(out, keystream) }
            } else {
                soft::xor_keystream(out, keystream);
            }
        }
    } else {
        pub(crate) type Tokens = ();

        pub(crate) fn init_tokens() -> Tokens {}

        pub(crate) fn xor_keystream(out: &mut [u8], keystream: &[u8], _tokens: Tokens) {
            soft::xor_keystream(out, keystream);
        }
    }
}
