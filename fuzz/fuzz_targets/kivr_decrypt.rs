//! Fuzz target for KIVR decryption of arbitrary bytes
//!
//! Feeds attacker-controlled ciphertext, nonce, key and associated data
//! straight into `decrypt`. Looks for:
//! - Panics in length arithmetic or keystream handling
//! - Out-of-bounds access on short or oddly sized buffers
//! - Any plaintext left behind after a rejected call
//!
//! The fuzzer should NEVER panic. Invalid inputs must return an error.

#![no_main]

use libfuzzer_sys::fuzz_target;
use kivr_crypto::{decrypt, open, OVERHEAD};

fuzz_target!(|data: &[u8]| {
    // Split: key (first byte picks length) || nonce || ad || ciphertext
    let Some((&key_len, rest)) = data.split_first() else {
        return;
    };
    let key_len = (key_len as usize % 40).min(rest.len());
    let (key, rest) = rest.split_at(key_len);
    let nonce_len = 12.min(rest.len());
    let (nonce, rest) = rest.split_at(nonce_len);
    let ad_len = rest.first().map_or(0, |&b| b as usize % 16).min(rest.len());
    let (ad, ciphertext) = rest.split_at(ad_len);

    let plaintext_len = ciphertext.len().saturating_sub(OVERHEAD);
    let mut plaintext = vec![0xAAu8; plaintext_len];

    match decrypt(&mut plaintext, ciphertext, nonce, key, ad) {
        Ok(()) => {
            // Random bytes essentially never authenticate; if they do, the
            // allocating path must agree
            let opened = open(ciphertext, nonce, key, ad);
            assert_eq!(opened.as_deref(), Ok(plaintext.as_slice()));
        },
        Err(err) if err.is_fatal() => {
            assert!(plaintext.iter().all(|&b| b == 0), "rejected output must be zeroed");
        },
        Err(err) => {
            assert!(err.is_size_error());
        },
    }
});
