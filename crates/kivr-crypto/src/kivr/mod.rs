//! KIVR: context-committing AEAD over `ChaCha20-Poly1305`
//!
//! # Architecture
//!
//! ```text
//! key || nonce || associated data
//!        │
//!        ▼ ContextHash (BLAKE2b-512 by default)
//! subkey (32) || subnonce (12) || mask (REDUNDANCY_SIZE)
//!        │                              │
//!        │                              ▼ XOR with REDUNDANCY
//!        │                        masked marker
//!        ▼                              │
//! ChaCha20-Poly1305(subkey, subnonce, AD = empty)
//!        │                              │
//!        ▼                              ▼
//!   ciphertext = Enc(marker || plaintext) || tag
//! ```
//!
//! # Security Properties
//!
//! - Context commitment: a ciphertext opens only under the exact (key,
//!   nonce, associated data) it was sealed with
//! - Single verdict: tag and marker are checked together in constant time;
//!   failures are indistinguishable
//! - No residue: scratch buffers and failed plaintext output are zeroized on
//!   every exit path

pub mod context;
pub mod derivation;
pub mod error;
pub mod redundancy;
pub mod transform;

pub use context::{Blake2bContext, ContextHash};
#[cfg(feature = "sha512")]
pub use context::Sha512Context;
#[cfg(feature = "shake256")]
pub use context::Shake256Context;
pub use derivation::{TemporalData, derive_temporal_data};
pub use error::{Buffer, KivrError};
pub use transform::{Kivr, MAX_PADDED_SIZE};

/// `ChaCha20-Poly1305` key size
pub const KEY_SIZE: usize = 32;

/// `ChaCha20-Poly1305` (IETF) nonce size
pub const NONCE_SIZE: usize = 12;

/// Poly1305 tag size
pub const TAG_SIZE: usize = 16;

/// Redundancy marker size for the default `BLAKE2b` context hash
/// (64 − 32 − 12).
pub const REDUNDANCY_SIZE: usize = Kivr::<Blake2bContext>::REDUNDANCY_SIZE;

/// Ciphertext expansion for the default context hash.
pub const OVERHEAD: usize = REDUNDANCY_SIZE + TAG_SIZE;

/// Encrypt with the default `BLAKE2b` context hash.
///
/// See [`Kivr::encrypt`].
pub fn encrypt(
    ciphertext: &mut [u8],
    plaintext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: &[u8],
) -> Result<(), KivrError> {
    Kivr::<Blake2bContext>::encrypt(ciphertext, plaintext, nonce, key, associated_data)
}

/// Decrypt with the default `BLAKE2b` context hash.
///
/// See [`Kivr::decrypt`].
pub fn decrypt(
    plaintext: &mut [u8],
    ciphertext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: &[u8],
) -> Result<(), KivrError> {
    Kivr::<Blake2bContext>::decrypt(plaintext, ciphertext, nonce, key, associated_data)
}

/// Allocating [`encrypt`].
pub fn seal(
    plaintext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, KivrError> {
    Kivr::<Blake2bContext>::seal(plaintext, nonce, key, associated_data)
}

/// Allocating [`decrypt`].
pub fn open(
    ciphertext: &[u8],
    nonce: &[u8],
    key: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>, KivrError> {
    Kivr::<Blake2bContext>::open(ciphertext, nonce, key, associated_data)
}
