//! Context hashes used to derive temporal data
//!
//! A context hash absorbs (key, nonce, associated data) as sequential
//! fragments and emits `OUTPUT_SIZE` bytes in one shot. Whatever the output
//! holds beyond the subkey and subnonce becomes the redundancy mask, so the
//! hash capacity fixes the commitment strength:
//!
//! | Hash              | Output | Redundancy |
//! |-------------------|--------|------------|
//! | `BLAKE2b` (default) | 64     | 20         |
//! | SHA-512           | 64     | 20         |
//! | SHAKE256          | 76     | 32         |

use blake2::{
    Blake2bVar,
    digest::{Update, VariableOutput},
};

use super::{KEY_SIZE, NONCE_SIZE};

/// Redundancy marker shared by the 64-byte hashes.
const REDUNDANCY_20: &[u8; 20] = b"KIVR-redundancy-v1.0";

/// Hash that maps a committed context to temporal data.
///
/// Implementations must be deterministic and must write exactly
/// `OUTPUT_SIZE` bytes. `REDUNDANCY` must be exactly
/// `OUTPUT_SIZE - KEY_SIZE - NONCE_SIZE` bytes long; this is checked at
/// compile time wherever the hash is used.
pub trait ContextHash {
    /// Bytes produced by one derivation.
    const OUTPUT_SIZE: usize;

    /// Public redundancy constant placed (masked) in front of every plaintext.
    const REDUNDANCY: &'static [u8];

    /// Hash `fragments` in order and fill `output` (exactly `OUTPUT_SIZE`
    /// bytes).
    fn hash_fragments(fragments: &[&[u8]], output: &mut [u8]);
}

/// Length of the redundancy marker for a hash with the given output size.
///
/// Evaluated in const context: a hash smaller than `KEY_SIZE + NONCE_SIZE`
/// fails to compile.
pub const fn redundancy_size(output_size: usize) -> usize {
    output_size - KEY_SIZE - NONCE_SIZE
}

/// Unkeyed `BLAKE2b` with its maximum 64-byte output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake2bContext;

impl ContextHash for Blake2bContext {
    const OUTPUT_SIZE: usize = 64;
    const REDUNDANCY: &'static [u8] = REDUNDANCY_20;

    fn hash_fragments(fragments: &[&[u8]], output: &mut [u8]) {
        let Ok(mut hasher) = Blake2bVar::new(Self::OUTPUT_SIZE) else {
            unreachable!("64 bytes is the BLAKE2b maximum output size");
        };
        for fragment in fragments {
            hasher.update(fragment);
        }
        let Ok(()) = hasher.finalize_variable(output) else {
            unreachable!("output buffer is sized to OUTPUT_SIZE by the caller");
        };
    }
}

/// SHA-512, a fixed-output alternative with the same redundancy size.
#[cfg(feature = "sha512")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha512Context;

#[cfg(feature = "sha512")]
impl ContextHash for Sha512Context {
    const OUTPUT_SIZE: usize = 64;
    const REDUNDANCY: &'static [u8] = REDUNDANCY_20;

    fn hash_fragments(fragments: &[&[u8]], output: &mut [u8]) {
        use sha2::{Digest, Sha512, digest::generic_array::GenericArray};

        let mut hasher = Sha512::new();
        for fragment in fragments {
            Digest::update(&mut hasher, fragment);
        }
        hasher.finalize_into(GenericArray::from_mut_slice(output));
    }
}

/// SHAKE256 read out to 76 bytes, giving a 32-byte redundancy marker.
///
/// Use this where the 160-bit commitment of the 64-byte hashes is not
/// enough.
#[cfg(feature = "shake256")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Shake256Context;

#[cfg(feature = "shake256")]
impl ContextHash for Shake256Context {
    const OUTPUT_SIZE: usize = KEY_SIZE + NONCE_SIZE + 32;
    const REDUNDANCY: &'static [u8] = b"KIVR-SHAKE256-redundancy-marker!";

    fn hash_fragments(fragments: &[&[u8]], output: &mut [u8]) {
        use sha3::{
            Shake256,
            digest::{ExtendableOutput, Update},
        };

        let mut hasher = Shake256::default();
        for fragment in fragments {
            hasher.update(fragment);
        }
        hasher.finalize_xof_into(output);
    }
}
