// Crypto Layer Tests
// Authenticated seal/open under a pre-shared key

use ecolink::crypto::{CryptoError, PayloadCipher, KEY_SIZE, NONCE_SIZE, TAG_SIZE};

fn cipher() -> PayloadCipher {
    PayloadCipher::new([0x42; KEY_SIZE])
}

/// Test: open(seal(p)) == p for plaintexts of length 0..64
#[test]
fn test_roundtrip_all_lengths() {
    let cipher = cipher();

    for len in 0..=64usize {
        let plaintext: Vec<u8> = (0..len).map(|i| i as u8).collect();
        let sealed = cipher.seal(&plaintext).expect("Should seal");

        assert_eq!(
            sealed.len(),
            NONCE_SIZE + len + TAG_SIZE,
            "Sealed layout is nonce || ciphertext || tag"
        );

        let opened = cipher.open(&sealed).expect("Should open own output");
        assert_eq!(opened, plaintext, "Length {} must round-trip exactly", len);
    }
}

/// Test: every sealing uses a fresh nonce
#[test]
fn test_nonce_is_fresh_per_call() {
    let cipher = cipher();

    let a = cipher.seal(b"same plaintext").expect("Should seal");
    let b = cipher.seal(b"same plaintext").expect("Should seal");

    assert_ne!(a[..NONCE_SIZE], b[..NONCE_SIZE], "Nonces must differ");
    assert_ne!(a, b, "Whole blobs must differ");
}

/// Test: flipping any single bit anywhere in the sealed blob is rejected
#[test]
fn test_any_bit_flip_rejected() {
    let cipher = cipher();
    let sealed = cipher.seal(b"battery:37|temp:21").expect("Should seal");

    for byte in 0..sealed.len() {
        for bit in 0..8 {
            let mut tampered = sealed.clone();
            tampered[byte] ^= 1 << bit;

            let result = cipher.open(&tampered);
            assert_eq!(
                result,
                Err(CryptoError::IntegrityFailure),
                "Flip at byte {} bit {} must fail verification",
                byte,
                bit
            );
        }
    }
}

/// Test: the wrong key cannot open a sealed payload
#[test]
fn test_wrong_key_rejected() {
    let sealed = cipher().seal(b"secret").expect("Should seal");

    let other = PayloadCipher::new([0x43; KEY_SIZE]);
    assert_eq!(other.open(&sealed), Err(CryptoError::IntegrityFailure));
}

/// Test: input shorter than a nonce is malformed, not an integrity failure
#[test]
fn test_short_input_is_malformed() {
    let cipher = cipher();

    for len in 0..NONCE_SIZE {
        assert_eq!(cipher.open(&vec![0u8; len]), Err(CryptoError::Malformed));
    }
}

/// Test: truncating the tag fails verification
#[test]
fn test_truncated_tag_rejected() {
    let cipher = cipher();
    let sealed = cipher.seal(b"payload").expect("Should seal");

    let truncated = &sealed[..sealed.len() - 1];
    assert_eq!(cipher.open(truncated), Err(CryptoError::IntegrityFailure));
}

/// Test: hex key loading accepts 64 hex chars and rejects everything else
#[test]
fn test_key_from_hex() {
    let hex_key = "42".repeat(KEY_SIZE);
    let from_hex = PayloadCipher::from_hex(&hex_key).expect("Should accept 64 hex chars");

    // Same key bytes: each cipher can open the other's output
    let sealed = cipher().seal(b"cross").expect("Should seal");
    assert_eq!(from_hex.open(&sealed).expect("Should open"), b"cross");

    assert!(PayloadCipher::from_hex("deadbeef").is_err(), "Too short");
    assert!(PayloadCipher::from_hex("not hex at all!").is_err());
}
