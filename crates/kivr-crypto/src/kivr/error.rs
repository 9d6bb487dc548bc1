//! Error types for KIVR operations

use std::fmt;

use thiserror::Error;

/// Caller-supplied buffer named in a size error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    /// The 32-byte key
    Key,
    /// The 12-byte nonce
    Nonce,
    /// Ciphertext input or output
    Ciphertext,
    /// Plaintext input or output
    Plaintext,
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Key => "key",
            Self::Nonce => "nonce",
            Self::Ciphertext => "ciphertext",
            Self::Plaintext => "plaintext",
        };
        f.write_str(name)
    }
}

/// Errors from KIVR encryption and decryption
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KivrError {
    /// A buffer does not have the exact length the transform requires
    #[error("invalid {buffer} length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Which buffer was rejected
        buffer: Buffer,
        /// Required length
        expected: usize,
        /// Length supplied by the caller
        actual: usize,
    },

    /// Ciphertext cannot even hold the redundancy marker and tag
    #[error("ciphertext too short: need at least {minimum} bytes, got {actual}")]
    CiphertextTooShort {
        /// Redundancy size plus tag size
        minimum: usize,
        /// Length supplied by the caller
        actual: usize,
    },

    /// Padded plaintext would exhaust the `ChaCha20` block counter
    #[error("message too long: padded length {actual} exceeds {maximum}")]
    MessageTooLong {
        /// Largest padded plaintext the keystream can cover
        maximum: u64,
        /// Padded length that was requested
        actual: u64,
    },

    /// Tag or redundancy check failed; the error never indicates which
    #[error("authentication failed")]
    AuthenticationFailed,
}

impl KivrError {
    /// Returns true if the caller passed wrongly sized buffers.
    ///
    /// Size errors are raised before any cryptographic work and indicate a
    /// usage mistake rather than an attack.
    pub fn is_size_error(&self) -> bool {
        match self {
            Self::InvalidLength { .. }
            | Self::CiphertextTooShort { .. }
            | Self::MessageTooLong { .. } => true,
            Self::AuthenticationFailed => false,
        }
    }

    /// Returns true if this error is fatal for the ciphertext.
    ///
    /// An authentication failure means the ciphertext was forged, corrupted,
    /// or opened under the wrong context. Retrying the same inputs cannot
    /// succeed.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::AuthenticationFailed => true,
            Self::InvalidLength { .. }
            | Self::CiphertextTooShort { .. }
            | Self::MessageTooLong { .. } => false,
        }
    }
}
