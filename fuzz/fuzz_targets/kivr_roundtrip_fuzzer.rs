//! Fuzz target for KIVR seal/open and context commitment
//!
//! # Strategy
//!
//! - Arbitrary keys, nonces, associated data and messages (including empty)
//! - Every context hash the crate ships
//! - Single-bit mutations of each context component and of the ciphertext
//!
//! # Invariants
//!
//! - Ciphertext length is always plaintext + OVERHEAD
//! - Sealing is deterministic
//! - Round-trip returns the original message
//! - Any mutated context or ciphertext fails with `AuthenticationFailed`
//!   and leaves the output buffer zeroed

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use kivr_crypto::{
    Blake2bContext, ContextHash, Kivr, KivrError, Sha512Context, Shake256Context, KEY_SIZE,
    NONCE_SIZE,
};

#[derive(Debug, Clone, Arbitrary)]
struct Scenario {
    hash: HashChoice,
    key: [u8; KEY_SIZE],
    nonce: [u8; NONCE_SIZE],
    associated_data: Vec<u8>,
    message: Vec<u8>,
    mutation: Mutation,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum HashChoice {
    Blake2b,
    Sha512,
    Shake256,
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Mutation {
    Key { index: u8, bit: u8 },
    Nonce { index: u8, bit: u8 },
    AssociatedData { index: u16, bit: u8 },
    AppendAssociatedData { byte: u8 },
    Ciphertext { index: u32, bit: u8 },
}

fn run<H: ContextHash>(scenario: &Scenario) {
    let Scenario { key, nonce, associated_data, message, mutation, .. } = scenario;

    // INVARIANT 1: Size contract
    let ciphertext = Kivr::<H>::seal(message, nonce, key, associated_data)
        .expect("valid sizes must seal");
    assert_eq!(ciphertext.len(), message.len() + Kivr::<H>::OVERHEAD);

    // INVARIANT 2: Determinism
    let again = Kivr::<H>::seal(message, nonce, key, associated_data).expect("valid sizes");
    assert_eq!(ciphertext, again, "sealing must be deterministic");

    // INVARIANT 3: Round-trip
    let opened = Kivr::<H>::open(&ciphertext, nonce, key, associated_data)
        .expect("valid ciphertext must open");
    assert_eq!(&opened, message);

    // INVARIANT 4: Commitment to every context component
    let mut key = *key;
    let mut nonce = *nonce;
    let mut associated_data = associated_data.clone();
    let mut ciphertext = ciphertext;

    match *mutation {
        Mutation::Key { index, bit } => {
            key[index as usize % KEY_SIZE] ^= 1 << (bit % 8);
        },
        Mutation::Nonce { index, bit } => {
            nonce[index as usize % NONCE_SIZE] ^= 1 << (bit % 8);
        },
        Mutation::AssociatedData { index, bit } => {
            if associated_data.is_empty() {
                associated_data.push(0);
            } else {
                let len = associated_data.len();
                associated_data[index as usize % len] ^= 1 << (bit % 8);
            }
        },
        Mutation::AppendAssociatedData { byte } => {
            associated_data.push(byte);
        },
        Mutation::Ciphertext { index, bit } => {
            let len = ciphertext.len();
            ciphertext[index as usize % len] ^= 1 << (bit % 8);
        },
    }

    let mut output = vec![0x5Au8; message.len()];
    let result = Kivr::<H>::decrypt(&mut output, &ciphertext, &nonce, &key, &associated_data);
    assert_eq!(result, Err(KivrError::AuthenticationFailed), "mutation {mutation:?} accepted");
    assert!(output.iter().all(|&b| b == 0), "rejected output must be zeroed");
}

fuzz_target!(|scenario: Scenario| {
    match scenario.hash {
        HashChoice::Blake2b => run::<Blake2bContext>(&scenario),
        HashChoice::Sha512 => run::<Sha512Context>(&scenario),
        HashChoice::Shake256 => run::<Shake256Context>(&scenario),
    }
});
