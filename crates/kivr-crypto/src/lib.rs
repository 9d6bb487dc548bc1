//! KIVR Context-Committing Encryption
//!
//! Upgrades `ChaCha20-Poly1305` into an AEAD that commits to its whole
//! context. A ciphertext that decrypts successfully proves which key, nonce
//! and associated data sealed it: no second context can open it.
//!
//! # How it works
//!
//! The caller's key, nonce and associated data are hashed into temporal data:
//! a subkey, a subnonce and a mask. The mask hides a public redundancy
//! constant that is prepended to the plaintext, and the padded plaintext is
//! sealed under the subkey and subnonce with empty associated data.
//!
//! ```text
//! ciphertext = ChaCha20-Poly1305(subkey, subnonce, "", (REDUNDANCY ^ mask) || plaintext)
//! ```
//!
//! Decryption re-derives everything from the caller's context, recomputes the
//! tag, unmasks the marker, and releases plaintext only if both the tag and
//! the marker match. Forging a ciphertext for a second context means beating
//! Poly1305 and predicting the hash-derived mask at the same time.
//!
//! # Sizes
//!
//! With the default `BLAKE2b` context hash:
//!
//! - key: 32 bytes, nonce: 12 bytes, tag: 16 bytes
//! - redundancy: 20 bytes (64-byte hash output minus key and nonce)
//! - `ciphertext.len() == plaintext.len() + 36`
//!
//! `Shake256Context` widens the redundancy to 32 bytes for stronger
//! commitment.
//!
//! # Security
//!
//! - Nonces must never repeat under one key; KIVR inherits the underlying
//!   AEAD's nonce-misuse behaviour
//! - Authentication failures are a single opaque error
//! - All intermediate key material is zeroized before returning

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod kivr;

#[cfg(feature = "sha512")]
pub use kivr::Sha512Context;
#[cfg(feature = "shake256")]
pub use kivr::Shake256Context;
pub use kivr::{
    Blake2bContext, Buffer, ContextHash, KEY_SIZE, Kivr, KivrError, MAX_PADDED_SIZE, NONCE_SIZE,
    OVERHEAD, REDUNDANCY_SIZE, TAG_SIZE, TemporalData, decrypt, derive_temporal_data, encrypt,
    open, seal,
};
