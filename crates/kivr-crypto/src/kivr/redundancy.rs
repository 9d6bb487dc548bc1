//! Redundancy marker masking
//!
//! The marker is a public constant XORed with the context-dependent mask.
//! Recovering the constant after decryption proves the mask, and so the
//! context, matched.

use subtle::{Choice, ConstantTimeEq};

/// Write `redundancy ^ mask` into `out`.
///
/// All three slices must have the same length.
pub fn mask_redundancy(out: &mut [u8], redundancy: &[u8], mask: &[u8]) {
    debug_assert_eq!(out.len(), redundancy.len());
    debug_assert_eq!(out.len(), mask.len());

    for ((o, r), m) in out.iter_mut().zip(redundancy).zip(mask) {
        *o = r ^ m;
    }
}

/// Remove the mask from a decrypted marker, in place.
pub fn unmask_in_place(marker: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(marker.len(), mask.len());

    for (b, m) in marker.iter_mut().zip(mask) {
        *b ^= m;
    }
}

/// Constant-time check that an unmasked marker equals the redundancy constant.
///
/// Length mismatch yields false.
pub fn redundancy_matches(candidate: &[u8], redundancy: &[u8]) -> Choice {
    candidate.ct_eq(redundancy)
}
