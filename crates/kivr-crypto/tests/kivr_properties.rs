//! Property-based tests for the KIVR transform
//!
//! These tests verify the fundamental invariants of context commitment:
//!
//! 1. **Round-trip**: open(seal(m)) == m for every context
//! 2. **Tamper sensitivity**: any single bit flip in ciphertext, nonce, key
//!    or associated data is rejected and leaves the output all-zero
//! 3. **Determinism**: same inputs always produce the same ciphertext
//! 4. **Size contracts**: wrongly sized buffers fail before any crypto

use kivr_crypto::{
    Blake2bContext, Buffer, ContextHash, KEY_SIZE, Kivr, KivrError, NONCE_SIZE, OVERHEAD, decrypt,
    encrypt, open, seal,
};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn key_strategy() -> impl Strategy<Value = [u8; KEY_SIZE]> {
    any::<[u8; KEY_SIZE]>()
}

fn nonce_strategy() -> impl Strategy<Value = [u8; NONCE_SIZE]> {
    any::<[u8; NONCE_SIZE]>()
}

fn assert_rejected(plaintext: &[u8], ciphertext: &[u8], nonce: &[u8], key: &[u8], ad: &[u8]) {
    let mut output = vec![0xCCu8; plaintext.len()];
    let result = decrypt(&mut output, ciphertext, nonce, key, ad);

    assert_eq!(result, Err(KivrError::AuthenticationFailed));
    assert!(output.iter().all(|&b| b == 0), "failed decrypt must leave output zeroed");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_encrypt_decrypt_roundtrip(
        plaintext in prop::collection::vec(any::<u8>(), 0..1000),
        associated_data in prop::collection::vec(any::<u8>(), 0..100),
        key in key_strategy(),
        nonce in nonce_strategy(),
    ) {
        init_tracing();
        let ciphertext = seal(&plaintext, &nonce, &key, &associated_data).unwrap();
        prop_assert_eq!(ciphertext.len(), plaintext.len() + OVERHEAD);

        let decrypted = open(&ciphertext, &nonce, &key, &associated_data).unwrap();
        prop_assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn prop_ciphertext_bit_flip_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..200),
        key in key_strategy(),
        nonce in nonce_strategy(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut ciphertext = seal(&plaintext, &nonce, &key, b"ad").unwrap();
        let index = position.index(ciphertext.len());
        ciphertext[index] ^= 1 << bit;

        assert_rejected(&plaintext, &ciphertext, &nonce, &key, b"ad");
    }

    #[test]
    fn prop_nonce_bit_flip_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..200),
        key in key_strategy(),
        nonce in nonce_strategy(),
        position in 0usize..NONCE_SIZE,
        bit in 0u8..8,
    ) {
        let ciphertext = seal(&plaintext, &nonce, &key, b"ad").unwrap();
        let mut wrong_nonce = nonce;
        wrong_nonce[position] ^= 1 << bit;

        assert_rejected(&plaintext, &ciphertext, &wrong_nonce, &key, b"ad");
    }

    #[test]
    fn prop_key_bit_flip_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..200),
        key in key_strategy(),
        nonce in nonce_strategy(),
        position in 0usize..KEY_SIZE,
        bit in 0u8..8,
    ) {
        let ciphertext = seal(&plaintext, &nonce, &key, b"ad").unwrap();
        let mut wrong_key = key;
        wrong_key[position] ^= 1 << bit;

        assert_rejected(&plaintext, &ciphertext, &nonce, &wrong_key, b"ad");
    }

    #[test]
    fn prop_associated_data_bit_flip_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..200),
        associated_data in prop::collection::vec(any::<u8>(), 1..100),
        key in key_strategy(),
        nonce in nonce_strategy(),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let ciphertext = seal(&plaintext, &nonce, &key, &associated_data).unwrap();
        let mut wrong_ad = associated_data.clone();
        let index = position.index(wrong_ad.len());
        wrong_ad[index] ^= 1 << bit;

        assert_rejected(&plaintext, &ciphertext, &nonce, &key, &wrong_ad);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_encrypt_deterministic(
        plaintext in prop::collection::vec(any::<u8>(), 0..500),
        associated_data in prop::collection::vec(any::<u8>(), 0..50),
        key in key_strategy(),
        nonce in nonce_strategy(),
    ) {
        let first = seal(&plaintext, &nonce, &key, &associated_data).unwrap();
        let second = seal(&plaintext, &nonce, &key, &associated_data).unwrap();
        prop_assert_eq!(first, second, "same inputs must produce same ciphertext");
    }

    #[test]
    fn prop_associated_data_extension_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..100),
        associated_data in prop::collection::vec(any::<u8>(), 0..50),
        extra in any::<u8>(),
        key in key_strategy(),
        nonce in nonce_strategy(),
    ) {
        let ciphertext = seal(&plaintext, &nonce, &key, &associated_data).unwrap();
        let mut extended = associated_data.clone();
        extended.push(extra);

        assert_rejected(&plaintext, &ciphertext, &nonce, &key, &extended);
    }

    #[test]
    fn prop_wrong_ciphertext_len_rejected(
        plaintext in prop::collection::vec(any::<u8>(), 0..100),
        delta in 1usize..40,
        longer in any::<bool>(),
    ) {
        let expected = plaintext.len() + OVERHEAD;
        let actual = if longer { expected + delta } else { expected.saturating_sub(delta) };
        let mut ciphertext = vec![0u8; actual];

        let result = encrypt(&mut ciphertext, &plaintext, &[0u8; NONCE_SIZE], &[0u8; KEY_SIZE], b"");
        prop_assert_eq!(
            result,
            Err(KivrError::InvalidLength { buffer: Buffer::Ciphertext, expected, actual })
        );
        prop_assert!(ciphertext.iter().all(|&b| b == 0), "output untouched on size error");
    }

    #[test]
    fn prop_wrong_key_and_nonce_len_rejected(
        key in prop::collection::vec(any::<u8>(), 0..64),
        nonce in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let mut ciphertext = vec![0u8; OVERHEAD];
        let result = encrypt(&mut ciphertext, b"", &nonce, &key, b"");

        if nonce.len() != NONCE_SIZE {
            prop_assert_eq!(
                result,
                Err(KivrError::InvalidLength {
                    buffer: Buffer::Nonce,
                    expected: NONCE_SIZE,
                    actual: nonce.len(),
                })
            );
        } else if key.len() != KEY_SIZE {
            prop_assert_eq!(
                result,
                Err(KivrError::InvalidLength {
                    buffer: Buffer::Key,
                    expected: KEY_SIZE,
                    actual: key.len(),
                })
            );
        } else {
            prop_assert!(result.is_ok());
        }
    }
}

#[test]
fn decrypt_rejects_short_ciphertext() {
    for len in 0..OVERHEAD {
        let ciphertext = vec![0u8; len];
        let result = decrypt(&mut [], &ciphertext, &[0u8; NONCE_SIZE], &[0u8; KEY_SIZE], b"");
        assert_eq!(result, Err(KivrError::CiphertextTooShort { minimum: OVERHEAD, actual: len }));
    }
}

#[test]
fn decrypt_rejects_wrong_plaintext_len() {
    let key = [1u8; KEY_SIZE];
    let nonce = [2u8; NONCE_SIZE];
    let ciphertext = seal(b"twelve bytes", &nonce, &key, b"").unwrap();

    for len in [0usize, 11, 13, 100] {
        let mut plaintext = vec![0u8; len];
        let result = decrypt(&mut plaintext, &ciphertext, &nonce, &key, b"");
        assert_eq!(
            result,
            Err(KivrError::InvalidLength { buffer: Buffer::Plaintext, expected: 12, actual: len })
        );
    }
}

#[test]
fn open_rejects_short_ciphertext() {
    let result = open(&[0u8; 35], &[0u8; NONCE_SIZE], &[0u8; KEY_SIZE], b"");
    assert_eq!(result, Err(KivrError::CiphertextTooShort { minimum: 36, actual: 35 }));
}

#[test]
fn truncated_ciphertext_rejected() {
    let key = [3u8; KEY_SIZE];
    let nonce = [4u8; NONCE_SIZE];
    let ciphertext = seal(b"some message", &nonce, &key, b"").unwrap();

    let truncated = &ciphertext[..ciphertext.len() - 1];
    let result = open(truncated, &nonce, &key, b"");
    assert_eq!(result, Err(KivrError::AuthenticationFailed));
}

#[test]
fn empty_associated_data_is_its_own_context() {
    let key = [5u8; KEY_SIZE];
    let nonce = [6u8; NONCE_SIZE];
    let ciphertext = seal(b"msg", &nonce, &key, &[]).unwrap();

    assert_eq!(open(&ciphertext, &nonce, &key, b"").unwrap(), b"msg");
    assert_eq!(open(&ciphertext, &nonce, &key, &[0]), Err(KivrError::AuthenticationFailed));
}

#[cfg(any(feature = "sha512", feature = "shake256"))]
fn cross_hash_rejected<A: ContextHash, B: ContextHash>() {
    let key = [7u8; KEY_SIZE];
    let nonce = [8u8; NONCE_SIZE];
    let ciphertext = Kivr::<A>::seal(b"cross hash", &nonce, &key, b"").unwrap();

    let result = Kivr::<B>::open(&ciphertext, &nonce, &key, b"");
    assert!(result.is_err(), "ciphertext must not open under a different context hash");
}

#[cfg(feature = "sha512")]
#[test]
fn blake2b_and_sha512_do_not_interoperate() {
    cross_hash_rejected::<Blake2bContext, kivr_crypto::Sha512Context>();
    cross_hash_rejected::<kivr_crypto::Sha512Context, Blake2bContext>();
}

#[cfg(feature = "shake256")]
#[test]
fn shake256_roundtrip_and_isolation() {
    use kivr_crypto::Shake256Context;

    let key = [9u8; KEY_SIZE];
    let nonce = [10u8; NONCE_SIZE];
    let ciphertext = Kivr::<Shake256Context>::seal(b"wide marker", &nonce, &key, b"ad").unwrap();
    assert_eq!(ciphertext.len(), 11 + 48);

    let opened = Kivr::<Shake256Context>::open(&ciphertext, &nonce, &key, b"ad").unwrap();
    assert_eq!(opened, b"wide marker");

    cross_hash_rejected::<Shake256Context, Blake2bContext>();
}
