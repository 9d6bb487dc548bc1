//! Temporal data derivation
//!
//! Maps (key, nonce, associated data) to a subkey, a subnonce, and a
//! redundancy mask. The associated data influences the ciphertext only
//! through this step; the AEAD layer below always sees empty AD.

use zeroize::Zeroize;

use super::{
    KEY_SIZE, NONCE_SIZE,
    context::{ContextHash, redundancy_size},
};

/// Largest context hash output the stack buffer can hold.
pub const MAX_TEMPORAL_SIZE: usize = 128;

/// Per-call key material derived from the committed context.
///
/// Layout: `subkey (32) || subnonce (12) || mask (OUTPUT_SIZE - 44)`.
/// Lives on the stack and is zeroized on drop.
pub struct TemporalData {
    bytes: [u8; MAX_TEMPORAL_SIZE],
    len: usize,
}

impl TemporalData {
    /// Empty buffer, ready for [`derive`](Self::derive).
    pub(crate) const fn empty() -> Self {
        Self { bytes: [0u8; MAX_TEMPORAL_SIZE], len: 0 }
    }

    /// Overwrite this buffer with the temporal data for the given context.
    ///
    /// Hashes key, then nonce, then associated data.
    pub(crate) fn derive<H: ContextHash>(
        &mut self,
        key: &[u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        associated_data: &[u8],
    ) {
        const {
            assert!(H::OUTPUT_SIZE <= MAX_TEMPORAL_SIZE, "context hash output too large");
            assert!(
                H::REDUNDANCY.len() == redundancy_size(H::OUTPUT_SIZE),
                "redundancy constant must fill the hash output past key and nonce"
            );
        }

        self.bytes.zeroize();
        self.len = H::OUTPUT_SIZE;
        H::hash_fragments(
            &[key.as_slice(), nonce.as_slice(), associated_data],
            &mut self.bytes[..H::OUTPUT_SIZE],
        );
    }

    /// Derived 32-byte `ChaCha20` key.
    pub fn subkey(&self) -> &[u8] {
        &self.bytes[..KEY_SIZE]
    }

    /// Derived 12-byte nonce.
    pub fn subnonce(&self) -> &[u8] {
        &self.bytes[KEY_SIZE..KEY_SIZE + NONCE_SIZE]
    }

    /// Mask applied to the redundancy marker.
    pub fn mask(&self) -> &[u8] {
        self.bytes.get(KEY_SIZE + NONCE_SIZE..self.len).unwrap_or_default()
    }

    /// Whole derived output.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    #[cfg(test)]
    pub(crate) fn is_zeroed(&self) -> bool {
        self.len == 0 && self.bytes.iter().all(|&b| b == 0)
    }
}

impl Zeroize for TemporalData {
    fn zeroize(&mut self) {
        self.bytes.zeroize();
        self.len = 0;
    }
}

impl Drop for TemporalData {
    fn drop(&mut self) {
        self.zeroize();
    }
}

/// Derive the temporal data for a (key, nonce, associated data) context.
///
/// Deterministic: the same context always yields the same subkey, subnonce
/// and mask. Associated data may be empty.
pub fn derive_temporal_data<H: ContextHash>(
    key: &[u8; KEY_SIZE],
    nonce: &[u8; NONCE_SIZE],
    associated_data: &[u8],
) -> TemporalData {
    let mut temporal = TemporalData::empty();
    temporal.derive::<H>(key, nonce, associated_data);
    temporal
}
