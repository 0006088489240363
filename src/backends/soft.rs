//! Portable keystream XOR which does not rely on architecture-specific
//! intrinsics.

pub(crate) fn xor_keystream(out: &mut [u8], keystream: &[u8]) {
    debug_assert!(out.len() <= keystream.len());

    let mut out_words = out.chunks_exact_mut(8);
    let mut ks_words = keystream.chunks_exact(8);
    for (out_word, ks_word) in out_words.by_ref().zip(ks_words.by_ref()) {
        let xored = u64::from_ne_bytes((&*out_word).try_into().unwrap())
            ^ u64::from_ne_bytes(ks_word.try_into().unwrap());
        out_word.copy_from_slice(&xored.to_ne_bytes());
    }

    for (out_byte, ks_byte) in out_words
        .into_remainder()
        .iter_mut()
        .zip(ks_words.remainder())
    {
        *out_byte ^= ks_byte;
    }
}
