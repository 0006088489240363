//! ChaCha20-Poly1305 authenticated encryption ([RFC 8439]).
//!
//! This crate implements the ChaCha20 stream cipher, the Poly1305 one-time
//! authenticator, and their AEAD composition as a self-contained unit. All
//! long-lived secret material (cipher state, MAC key and accumulator) is held
//! in page-locked heap storage and wiped on drop.
//!
//! # Security Warning
//!
//! Using the same (key, nonce) pair for two messages destroys both
//! confidentiality and authenticity. Nonce management is the caller's
//! responsibility; this crate does not detect reuse.
//!
//! # Usage
//!
//! ```
//! use chacha_aead::{aead, ChaCha20};
//!
//! let key = [0x42u8; 32];
//! let nonce = [0x24u8; 12];
//!
//! let plaintext = b"attack at dawn";
//! let mut ciphertext = [0u8; 14];
//!
//! let mut cipher = ChaCha20::new(&key, &nonce)?;
//! let tag = aead::encrypt(&mut cipher, plaintext, b"header", &mut ciphertext)?;
//!
//! let mut recovered = [0u8; 14];
//! aead::decrypt(&mut cipher, &ciphertext, b"header", &tag, &mut recovered)?;
//! assert_eq!(&recovered, plaintext);
//! # Ok::<(), chacha_aead::Error>(())
//! ```
//!
//! The AEAD wire output is `ciphertext || tag`; the nonce is transmitted out
//! of band by the surrounding protocol.
//!
//! [RFC 8439]: https://datatracker.ietf.org/doc/html/rfc8439

#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

pub mod aead;
mod backends;
mod chacha;
mod errors;
mod poly1305;
pub mod secret;

pub use crate::chacha::ChaCha20;
pub use crate::errors::Error;
pub use crate::poly1305::Poly1305;

/// Size of a ChaCha20 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of a ChaCha20 nonce in bytes (IETF 96-bit variant).
pub const NONCE_SIZE: usize = 12;

/// Size of a ChaCha20 keystream block in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Size of a Poly1305 authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Number of 32-bit words in the ChaCha20 state.
pub(crate) const STATE_WORDS: usize = 16;

/// State initialization constant ("expand 32-byte k").
pub(crate) const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];
