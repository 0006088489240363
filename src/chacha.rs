//! The ChaCha20 stream cipher (RFC 8439, 96-bit nonce, 32-bit block
//! counter).

use zeroize::Zeroize;

use crate::backends;
use crate::errors::Error;
use crate::secret::SecretBox;
use crate::{BLOCK_SIZE, CONSTANTS, KEY_SIZE, NONCE_SIZE, STATE_WORDS};

/// Cipher state, 64-byte aligned. Words 0..4 hold the constants and are
/// never written after construction; words 4..12 the key, word 12 the block
/// counter, words 13..16 the nonce.
#[derive(Zeroize)]
#[repr(align(64))]
struct State([u32; STATE_WORDS]);

/// The ChaCha20 stream cipher (IETF variant: 256-bit key, 96-bit nonce,
/// 32-bit block counter).
///
/// The state lives in a page-locked [`SecretBox`] and is wiped on drop.
/// Instances are single-owner: [`process`](Self::process) mutates the block
/// counter, so a cipher must not be shared across threads.
pub struct ChaCha20 {
    state: SecretBox<State>,
    tokens: backends::Tokens,
}

impl ChaCha20 {
    /// Initialize from a 32-byte key and a 12-byte nonce.
    ///
    /// The block counter starts at 0. Returns [`Error::InvalidArgument`]
    /// for any other slice lengths.
    pub fn new(key: &[u8], nonce: &[u8]) -> Result<Self, Error> {
        let key: &[u8; KEY_SIZE] = key.try_into().map_err(|_| Error::InvalidArgument)?;
        let nonce: &[u8; NONCE_SIZE] = nonce.try_into().map_err(|_| Error::InvalidArgument)?;
        Ok(Self::init(key, nonce))
    }

    /// Construct a cipher from a fresh key and nonce drawn from the OS RNG.
    ///
    /// The nonce is returned alongside the cipher so it can be transmitted
    /// out of band; the key never leaves the page-locked state.
    #[cfg(feature = "getrandom")]
    pub fn generate() -> Result<(Self, [u8; NONCE_SIZE]), getrandom::Error> {
        let mut key = zeroize::Zeroizing::new([0u8; KEY_SIZE]);
        let mut nonce = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut *key)?;
        getrandom::getrandom(&mut nonce)?;
        Ok((Self::init(&key, &nonce), nonce))
    }

    fn init(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE]) -> Self {
        let mut words = [0u32; STATE_WORDS];
        words[..4].copy_from_slice(&CONSTANTS);
        for (val, chunk) in words[4..12].iter_mut().zip(key.chunks_exact(4)) {
            *val = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        for (val, chunk) in words[13..].iter_mut().zip(nonce.chunks_exact(4)) {
            *val = u32::from_le_bytes(chunk.try_into().unwrap());
        }

        Self {
            state: SecretBox::new(State(words)),
            tokens: backends::init_tokens(),
        }
    }

    /// Overwrite the block counter (state word 12). No validation.
    pub fn set_counter(&mut self, counter: u32) {
        self.state.0[12] = counter;
    }

    /// The current block counter.
    pub fn counter(&self) -> u32 {
        self.state.0[12]
    }

    /// Whether the state's backing pages were successfully page-locked.
    pub fn memory_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// XOR the keystream into `input`, writing the result to `output`.
    ///
    /// Consecutive calls continue from the current counter: every started
    /// 64-byte block consumes one counter increment, and the unused tail of
    /// a partial final block is discarded. Callers that need deterministic
    /// positioning must call [`set_counter`](Self::set_counter) first.
    ///
    /// Returns [`Error::InvalidArgument`] for empty buffers, mismatched
    /// lengths, or a message that would wrap the 32-bit counter.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<(), Error> {
        if input.is_empty() || input.len() != output.len() {
            return Err(Error::InvalidArgument);
        }
        self.check_counter_span(input.len())?;
        output.copy_from_slice(input);
        self.xor_keystream(output);
        Ok(())
    }

    /// In-place form of [`process`](Self::process): `data` is both input and
    /// output.
    pub fn apply_keystream(&mut self, data: &mut [u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Err(Error::InvalidArgument);
        }
        self.check_counter_span(data.len())?;
        self.xor_keystream(data);
        Ok(())
    }

    // A message needing more blocks than remain before the 32-bit counter
    // wraps (256 GiB from the current position) is rejected up front.
    fn check_counter_span(&self, len: usize) -> Result<(), Error> {
        let blocks = (len as u64).div_ceil(BLOCK_SIZE as u64);
        let remaining = (1u64 << 32) - u64::from(self.state.0[12]);
        if blocks > remaining {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    fn xor_keystream(&mut self, data: &mut [u8]) {
        let mut keystream = [0u8; BLOCK_SIZE];
        for chunk in data.chunks_mut(BLOCK_SIZE) {
            self.block_function(&mut keystream, chunk.len());
            backends::xor_keystream(chunk, &keystream[..chunk.len()], self.tokens);
        }
        keystream.zeroize();
    }

    // One keystream block: 10 double rounds over a working copy, word-wise
    // add-back of the state, little-endian serialization of the first
    // `to_copy` bytes. Post-increments the counter (wrapping).
    fn block_function(&mut self, output: &mut [u8; BLOCK_SIZE], to_copy: usize) {
        debug_assert!(to_copy <= BLOCK_SIZE);

        let mut working = self.state.0;
        for _ in 0..10 {
            // column rounds
            quarter_round(0, 4, 8, 12, &mut working);
            quarter_round(1, 5, 9, 13, &mut working);
            quarter_round(2, 6, 10, 14, &mut working);
            quarter_round(3, 7, 11, 15, &mut working);
            // diagonal rounds
            quarter_round(0, 5, 10, 15, &mut working);
            quarter_round(1, 6, 11, 12, &mut working);
            quarter_round(2, 7, 8, 13, &mut working);
            quarter_round(3, 4, 9, 14, &mut working);
        }

        for (word, initial) in working.iter_mut().zip(self.state.0.iter()) {
            *word = word.wrapping_add(*initial);
        }

        for (chunk, val) in output
            .chunks_exact_mut(4)
            .zip(working.iter())
            .take(to_copy.div_ceil(4))
        {
            chunk.copy_from_slice(&val.to_le_bytes());
        }
        working.zeroize();

        self.state.0[12] = self.state.0[12].wrapping_add(1);
    }
}

#[inline(always)]
fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [u32; STATE_WORDS]) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}
