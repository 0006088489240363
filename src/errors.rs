//! Error types.

use core::fmt;

/// Errors produced by the cipher and AEAD APIs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A buffer was empty, input and output lengths disagreed, a key or
    /// nonce had the wrong length, or the requested message would exhaust
    /// the 32-bit block counter.
    InvalidArgument,

    /// AEAD tag verification failed. Carries no further detail.
    AuthenticationFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::AuthenticationFailed => f.write_str("authentication failed"),
        }
    }
}

impl std::error::Error for Error {}
