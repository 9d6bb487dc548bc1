//! Encrypt and decrypt drivers for the KIVR transform
//!
//! Encryption writes `mask ^ REDUNDANCY || plaintext` into the ciphertext
//! body and seals it in place with `ChaCha20-Poly1305` under the derived
//! subkey and subnonce, with empty associated data.
//!
//! Decryption does not go through the AEAD's own `decrypt`. It rebuilds the
//! Poly1305 tag from keystream block 0, decrypts from block 1, and accepts the
//! result only if the tag AND the unmasked marker both match. The two checks
//! are combined with a non-short-circuit `Choice` AND, so a failure reveals
//! nothing about which one tripped.

use std::marker::PhantomData;

use chacha20::{
    ChaCha20,
    cipher::{KeyIvInit, StreamCipher, StreamCipherSeek},
};
use chacha20poly1305::{
    ChaCha20Poly1305,
    aead::{AeadInPlace, KeyInit},
};
use poly1305::{Block, Poly1305, universal_hash::UniversalHash};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::{
    KEY_SIZE, NONCE_SIZE, TAG_SIZE,
    context::{Blake2bContext, ContextHash, redundancy_size},
    derivation::{MAX_TEMPORAL_SIZE, TemporalData},
    error::{Buffer, KivrError},
    redundancy::{mask_redundancy, redundancy_matches, unmask_in_place},
};

/// `ChaCha20` block size; block 0 is reserved for the Poly1305 key.
const CHACHA_BLOCK_SIZE: u64 = 64;

/// Poly1305 one-time key size
const MAC_KEY_SIZE: usize = 32;

/// Largest redundancy marker any supported hash can produce.
const MAX_REDUNDANCY_SIZE: usize = MAX_TEMPORAL_SIZE - KEY_SIZE - NONCE_SIZE;

/// Longest padded plaintext (marker plus message) the 32-bit block counter
/// can encrypt after the MAC block.
pub const MAX_PADDED_SIZE: u64 = (1 << 38) - CHACHA_BLOCK_SIZE;

/// Stack scratch for one transform call.
///
/// Cleared explicitly before every return and again on drop.
pub(crate) struct Scratch {
    temporal: TemporalData,
    mac_key: [u8; MAC_KEY_SIZE],
    marker: [u8; MAX_REDUNDANCY_SIZE],
    tag: [u8; TAG_SIZE],
}

impl Scratch {
    pub(crate) const fn new() -> Self {
        Self {
            temporal: TemporalData::empty(),
            mac_key: [0u8; MAC_KEY_SIZE],
            marker: [0u8; MAX_REDUNDANCY_SIZE],
            tag: [0u8; TAG_SIZE],
        }
    }

    #[cfg(test)]
    pub(crate) fn is_zeroed(&self) -> bool {
        self.temporal.is_zeroed()
            && self.mac_key.iter().all(|&b| b == 0)
            && self.marker.iter().all(|&b| b == 0)
            && self.tag.iter().all(|&b| b == 0)
    }
}

impl Zeroize for Scratch {
    fn zeroize(&mut self) {
        self.temporal.zeroize();
        self.mac_key.zeroize();
        self.marker.zeroize();
        self.tag.zeroize();
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// KIVR transform over `ChaCha20-Poly1305`, parameterized by its context hash.
///
/// Never instantiated; all operations are associated functions so the hash
/// choice is fixed at compile time:
///
/// ```
/// use kivr_crypto::{Kivr, Blake2bContext};
///
/// let key = [7u8; 32];
/// let nonce = [1u8; 12];
/// let sealed = Kivr::<Blake2bContext>::seal(b"hello", &nonce, &key, b"header").unwrap();
/// let opened = Kivr::<Blake2bContext>::open(&sealed, &nonce, &key, b"header").unwrap();
/// assert_eq!(opened, b"hello");
/// ```
pub struct Kivr<H: ContextHash = Blake2bContext> {
    _hash: PhantomData<H>,
}

impl<H: ContextHash> Kivr<H> {
    /// Length of the masked redundancy marker for this hash.
    pub const REDUNDANCY_SIZE: usize = redundancy_size(H::OUTPUT_SIZE);

    /// Ciphertext expansion: marker plus tag.
    pub const OVERHEAD: usize = Self::REDUNDANCY_SIZE + TAG_SIZE;

    /// Ciphertext length for a plaintext of `plaintext_len` bytes.
    pub const fn ciphertext_len(plaintext_len: usize) -> Option<usize> {
        plaintext_len.checked_add(Self::OVERHEAD)
    }

    /// Plaintext length for a ciphertext of `ciphertext_len` bytes, or `None`
    /// if the ciphertext cannot hold the marker and tag.
    pub const fn plaintext_len(ciphertext_len: usize) -> Option<usize> {
        ciphertext_len.checked_sub(Self::OVERHEAD)
    }

    /// Encrypt `plaintext` into `ciphertext`, committing to key, nonce and
    /// associated data.
    ///
    /// `ciphertext` must be exactly `plaintext.len() + OVERHEAD` bytes. All
    /// size checks run before any key material is derived.
    ///
    /// # Errors
    ///
    /// - `MessageTooLong`: padded plaintext exceeds the keystream
    /// - `InvalidLength`: ciphertext, nonce or key has the wrong length
    pub fn encrypt(
        ciphertext: &mut [u8],
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<(), KivrError> {
        let mut scratch = Scratch::new();
        Self::encrypt_with(&mut scratch, ciphertext, plaintext, nonce, key, associated_data)
    }

    /// Decrypt and verify `ciphertext` into `plaintext`.
    ///
    /// `plaintext` must be exactly `ciphertext.len() - OVERHEAD` bytes. On
    /// authentication failure it is left all-zero.
    ///
    /// # Errors
    ///
    /// - `CiphertextTooShort`: shorter than marker plus tag
    /// - `MessageTooLong`: padded plaintext exceeds the keystream
    /// - `InvalidLength`: plaintext, nonce or key has the wrong length
    /// - `AuthenticationFailed`: wrong key, nonce or associated data, or a
    ///   tampered ciphertext
    pub fn decrypt(
        plaintext: &mut [u8],
        ciphertext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<(), KivrError> {
        let mut scratch = Scratch::new();
        Self::decrypt_with(&mut scratch, plaintext, ciphertext, nonce, key, associated_data)
    }

    /// Encrypt into a freshly allocated ciphertext.
    pub fn seal(
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, KivrError> {
        check_padded_len(plaintext.len() as u64 + Self::REDUNDANCY_SIZE as u64)
            .inspect_err(|err| tracing::debug!(%err, "KIVR seal rejected"))?;

        let mut ciphertext = vec![0u8; plaintext.len() + Self::OVERHEAD];
        Self::encrypt(&mut ciphertext, plaintext, nonce, key, associated_data)?;
        Ok(ciphertext)
    }

    /// Decrypt into a freshly allocated plaintext.
    pub fn open(
        ciphertext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<Vec<u8>, KivrError> {
        let Some(plaintext_len) = Self::plaintext_len(ciphertext.len()) else {
            let err =
                KivrError::CiphertextTooShort { minimum: Self::OVERHEAD, actual: ciphertext.len() };
            tracing::debug!(%err, "KIVR open rejected");
            return Err(err);
        };

        let mut plaintext = vec![0u8; plaintext_len];
        Self::decrypt(&mut plaintext, ciphertext, nonce, key, associated_data)?;
        Ok(plaintext)
    }

    /// Encrypt using caller-provided scratch, which is zeroized on return.
    pub(crate) fn encrypt_with(
        scratch: &mut Scratch,
        ciphertext: &mut [u8],
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<(), KivrError> {
        let result = Self::seal_into(scratch, ciphertext, plaintext, nonce, key, associated_data);
        scratch.zeroize();
        result.inspect_err(|err| tracing::debug!(%err, "KIVR encrypt rejected"))
    }

    /// Decrypt using caller-provided scratch, which is zeroized on return.
    pub(crate) fn decrypt_with(
        scratch: &mut Scratch,
        plaintext: &mut [u8],
        ciphertext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<(), KivrError> {
        let result = Self::open_into(scratch, plaintext, ciphertext, nonce, key, associated_data);
        scratch.zeroize();
        result.inspect_err(|err| {
            tracing::debug!(%err, ciphertext_len = ciphertext.len(), "KIVR decrypt rejected");
        })
    }

    fn seal_into(
        scratch: &mut Scratch,
        ciphertext: &mut [u8],
        plaintext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<(), KivrError> {
        check_padded_len(plaintext.len() as u64 + Self::REDUNDANCY_SIZE as u64)?;

        let expected = plaintext.len() + Self::OVERHEAD;
        if ciphertext.len() != expected {
            return Err(KivrError::InvalidLength {
                buffer: Buffer::Ciphertext,
                expected,
                actual: ciphertext.len(),
            });
        }
        let nonce = exact_len::<NONCE_SIZE>(nonce, Buffer::Nonce)?;
        let key = exact_len::<KEY_SIZE>(key, Buffer::Key)?;

        scratch.temporal.derive::<H>(key, nonce, associated_data);

        let (body, tag_out) = ciphertext.split_at_mut(expected - TAG_SIZE);
        let (marker, message) = body.split_at_mut(Self::REDUNDANCY_SIZE);
        mask_redundancy(marker, H::REDUNDANCY, scratch.temporal.mask());
        message.copy_from_slice(plaintext);

        let cipher =
            ChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(scratch.temporal.subkey()));
        let subnonce = chacha20poly1305::Nonce::from_slice(scratch.temporal.subnonce());
        let Ok(tag) = cipher.encrypt_in_place_detached(subnonce, &[], body) else {
            unreachable!("padded length was checked against the keystream limit");
        };
        tag_out.copy_from_slice(&tag);

        Ok(())
    }

    fn open_into(
        scratch: &mut Scratch,
        plaintext: &mut [u8],
        ciphertext: &[u8],
        nonce: &[u8],
        key: &[u8],
        associated_data: &[u8],
    ) -> Result<(), KivrError> {
        if ciphertext.len() < Self::OVERHEAD {
            return Err(KivrError::CiphertextTooShort {
                minimum: Self::OVERHEAD,
                actual: ciphertext.len(),
            });
        }
        let body_len = ciphertext.len() - TAG_SIZE;
        check_padded_len(body_len as u64)?;

        let expected = body_len - Self::REDUNDANCY_SIZE;
        if plaintext.len() != expected {
            return Err(KivrError::InvalidLength {
                buffer: Buffer::Plaintext,
                expected,
                actual: plaintext.len(),
            });
        }
        let nonce = exact_len::<NONCE_SIZE>(nonce, Buffer::Nonce)?;
        let key = exact_len::<KEY_SIZE>(key, Buffer::Key)?;

        scratch.temporal.derive::<H>(key, nonce, associated_data);

        let (body, received_tag) = ciphertext.split_at(body_len);
        let (sealed_marker, sealed_message) = body.split_at(Self::REDUNDANCY_SIZE);

        let mut cipher = ChaCha20::new(
            chacha20::Key::from_slice(scratch.temporal.subkey()),
            chacha20::Nonce::from_slice(scratch.temporal.subnonce()),
        );
        cipher.apply_keystream(&mut scratch.mac_key);
        cipher.seek(CHACHA_BLOCK_SIZE);
        compute_tag(&scratch.mac_key, body, &mut scratch.tag);

        let marker = &mut scratch.marker[..Self::REDUNDANCY_SIZE];
        marker.copy_from_slice(sealed_marker);
        cipher.apply_keystream(marker);
        unmask_in_place(marker, scratch.temporal.mask());

        plaintext.copy_from_slice(sealed_message);
        cipher.apply_keystream(plaintext);

        let tag_ok = scratch.tag[..].ct_eq(received_tag);
        let redundancy_ok = redundancy_matches(marker, H::REDUNDANCY);

        if bool::from(tag_ok & redundancy_ok) {
            Ok(())
        } else {
            plaintext.zeroize();
            Err(KivrError::AuthenticationFailed)
        }
    }
}

/// Poly1305 tag in the RFC 8439 AEAD layout with empty associated data:
/// `pad16(body) || le64(0) || le64(body.len())`.
fn compute_tag(mac_key: &[u8; MAC_KEY_SIZE], body: &[u8], tag: &mut [u8; TAG_SIZE]) {
    let mut mac = Poly1305::new(poly1305::Key::from_slice(mac_key));
    mac.update_padded(body);

    let mut lengths = Block::default();
    lengths[..8].copy_from_slice(&0u64.to_le_bytes());
    lengths[8..].copy_from_slice(&(body.len() as u64).to_le_bytes());
    mac.update(&[lengths]);

    tag.copy_from_slice(&mac.finalize());
}

fn check_padded_len(padded_len: u64) -> Result<(), KivrError> {
    if padded_len > MAX_PADDED_SIZE {
        return Err(KivrError::MessageTooLong { maximum: MAX_PADDED_SIZE, actual: padded_len });
    }
    Ok(())
}

fn exact_len<const N: usize>(bytes: &[u8], buffer: Buffer) -> Result<&[u8; N], KivrError> {
    bytes.try_into().map_err(|_| KivrError::InvalidLength {
        buffer,
        expected: N,
        actual: bytes.len(),
    })
}
