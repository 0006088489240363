//! ChaCha20-Poly1305 AEAD composition (RFC 8439 §2.8).
//!
//! Per message: block 0 of the keystream keys a fresh [`Poly1305`]; the
//! payload is encrypted starting at block 1; the MAC absorbs the associated
//! data and the ciphertext (each zero-padded to a 16-byte boundary) followed
//! by both lengths as little-endian 64-bit words. Decryption verifies the
//! tag in constant time before any keystream is applied.
//!
//! Wire format: `ciphertext || tag`. The nonce is not part of the output and
//! must be carried out of band by the surrounding protocol.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::chacha::ChaCha20;
use crate::errors::Error;
use crate::poly1305::Poly1305;
use crate::{BLOCK_SIZE, TAG_SIZE};

const PAD: [u8; 15] = [0u8; 15];

/// Encrypt `plaintext` into `ciphertext` (equal lengths) and return the tag.
///
/// Zero-length plaintext and associated data are both legal; the all-empty
/// message authenticates only the length trailer.
pub fn encrypt(
    cipher: &mut ChaCha20,
    plaintext: &[u8],
    aad: &[u8],
    ciphertext: &mut [u8],
) -> Result<[u8; TAG_SIZE], Error> {
    if plaintext.len() != ciphertext.len() {
        return Err(Error::InvalidArgument);
    }

    let key = poly1305_key(cipher)?;
    cipher.set_counter(1);
    if !plaintext.is_empty() {
        cipher.process(plaintext, ciphertext)?;
    }
    Ok(authenticate(&key, aad, ciphertext))
}

/// Encrypt `data` in place and return the tag.
pub fn encrypt_in_place(
    cipher: &mut ChaCha20,
    data: &mut [u8],
    aad: &[u8],
) -> Result<[u8; TAG_SIZE], Error> {
    let key = poly1305_key(cipher)?;
    cipher.set_counter(1);
    if !data.is_empty() {
        cipher.apply_keystream(data)?;
    }
    Ok(authenticate(&key, aad, data))
}

/// Verify `tag` over `aad` and `ciphertext`, then decrypt into `plaintext`.
///
/// On [`Error::AuthenticationFailed`] nothing is written to `plaintext`, and
/// no information beyond the failure itself escapes; the comparison runs in
/// constant time.
pub fn decrypt(
    cipher: &mut ChaCha20,
    ciphertext: &[u8],
    aad: &[u8],
    tag: &[u8; TAG_SIZE],
    plaintext: &mut [u8],
) -> Result<(), Error> {
    if plaintext.len() != ciphertext.len() {
        return Err(Error::InvalidArgument);
    }

    let key = poly1305_key(cipher)?;
    verify(&key, aad, ciphertext, tag)?;

    cipher.set_counter(1);
    if !ciphertext.is_empty() {
        cipher.process(ciphertext, plaintext)?;
    }
    Ok(())
}

/// Verify `tag`, then decrypt `data` in place.
///
/// `data` is left untouched on [`Error::AuthenticationFailed`].
pub fn decrypt_in_place(
    cipher: &mut ChaCha20,
    data: &mut [u8],
    aad: &[u8],
    tag: &[u8; TAG_SIZE],
) -> Result<(), Error> {
    let key = poly1305_key(cipher)?;
    verify(&key, aad, data, tag)?;

    cipher.set_counter(1);
    if !data.is_empty() {
        cipher.apply_keystream(data)?;
    }
    Ok(())
}

// One-time key: the first 32 bytes of keystream block 0.
fn poly1305_key(cipher: &mut ChaCha20) -> Result<Zeroizing<[u8; Poly1305::KEY_SIZE]>, Error> {
    cipher.set_counter(0);
    let mut block = Zeroizing::new([0u8; BLOCK_SIZE]);
    cipher.apply_keystream(&mut *block)?;

    let mut key = Zeroizing::new([0u8; Poly1305::KEY_SIZE]);
    (*key).copy_from_slice(&block[..Poly1305::KEY_SIZE]);
    Ok(key)
}

fn authenticate(key: &[u8; Poly1305::KEY_SIZE], aad: &[u8], ciphertext: &[u8]) -> [u8; TAG_SIZE] {
    let mut mac = Poly1305::new(key);

    if !aad.is_empty() {
        mac.update(aad);
        pad_to_block(&mut mac, aad.len());
    }
    if !ciphertext.is_empty() {
        mac.update(ciphertext);
        pad_to_block(&mut mac, ciphertext.len());
    }

    let mut trailer = [0u8; 16];
    trailer[..8].copy_from_slice(&(aad.len() as u64).to_le_bytes());
    trailer[8..].copy_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    mac.update(&trailer);

    mac.finalize()
}

fn verify(
    key: &[u8; Poly1305::KEY_SIZE],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
) -> Result<(), Error> {
    let mut computed = authenticate(key, aad, ciphertext);
    let matched = bool::from(computed.ct_eq(tag));
    computed.zeroize();
    if matched {
        Ok(())
    } else {
        Err(Error::AuthenticationFailed)
    }
}

// Zero bytes fed through `update`, so the high-bit marker lands exactly as
// for any other streamed input.
fn pad_to_block(mac: &mut Poly1305, len: usize) {
    let rem = len % 16;
    if rem != 0 {
        mac.update(&PAD[..16 - rem]);
    }
}
