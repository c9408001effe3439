// Packet Codec Tests
// Wire header framing and the payload codecs

use ecolink::crypto::PayloadCipher;
use ecolink::packet::{
    CodecError, DelimitedCodec, Packet, PacketError, PayloadCodec, RawCodec, SealedCodec,
    FLAG_ACK, FLAG_AGGREGATED, HEADER_SIZE,
};

// ============================================================================
// HEADER CODEC
// ============================================================================

/// Test: decode(encode(...)) reproduces all fields exactly
#[test]
fn test_header_roundtrip() {
    let packet = Packet::new(42, FLAG_AGGREGATED, 200, b"TEMP:21|TEMP:22".to_vec());

    let bytes = packet.encode();
    let decoded = Packet::decode(&bytes).expect("Should decode valid packet");

    assert_eq!(decoded, packet);
}

/// Test: header layout is bit-exact big-endian
#[test]
fn test_header_layout_big_endian() {
    let packet = Packet::new(0x0102_0304, 0x03, 0x07, vec![0xAA]);

    let bytes = packet.encode();

    assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04, 0x03, 0x07, 0xAA]);
}

/// Test: extreme field values round-trip
#[test]
fn test_roundtrip_extreme_values() {
    let packet = Packet::new(u32::MAX, 0xFF, 255, Vec::new());

    let decoded = Packet::decode(&packet.encode()).expect("Should decode");

    assert_eq!(decoded.sequence, u32::MAX);
    assert_eq!(decoded.flags, 0xFF);
    assert_eq!(decoded.budget, 255);
    assert!(decoded.payload.is_empty());
}

/// Test: a datagram of exactly header size has an empty payload
#[test]
fn test_header_only_datagram() {
    let bytes = Packet::new(7, 0, 128, Vec::new()).encode();
    assert_eq!(bytes.len(), HEADER_SIZE);

    let decoded = Packet::decode(&bytes).expect("Should decode");
    assert!(decoded.payload.is_empty());
}

/// Test: fewer than 6 bytes is a parse failure, not a crash
#[test]
fn test_too_short_fails() {
    for len in 0..HEADER_SIZE {
        let result = Packet::decode(&vec![0u8; len]);
        assert_eq!(result, Err(PacketError::TooShort(len)));
    }
}

/// Test: decode never inspects the payload
#[test]
fn test_payload_passed_through_unmodified() {
    let garbage = vec![0x00, 0xFF, 0x7C, 0x01, 0x7C];
    let packet = Packet::new(1, 0, 50, garbage.clone());

    let decoded = Packet::decode(&packet.encode()).expect("Should decode");

    assert_eq!(decoded.payload, garbage);
}

/// Test: flag helpers
#[test]
fn test_flag_helpers() {
    let data = Packet::new(1, FLAG_AGGREGATED, 0, vec![1]);
    assert!(data.is_aggregated());
    assert!(!data.is_ack());

    let ack = Packet::new(1, FLAG_ACK, 0, Vec::new());
    assert!(ack.is_ack());
    assert!(!ack.is_aggregated());
}

/// Test: ACK constructor sets the flag, echoes the budget, empty payload
#[test]
fn test_ack_constructor() {
    let ack = Packet::ack(99, 42);

    assert_eq!(ack.sequence, 99);
    assert_eq!(ack.budget, 42);
    assert!(ack.is_ack());
    assert!(ack.payload.is_empty());
}

// ============================================================================
// DELIMITED CODEC
// ============================================================================

/// Test: delimited readings round-trip
#[test]
fn test_delimited_roundtrip() {
    let codec = DelimitedCodec::new();
    let readings = vec![b"TEMP:20".to_vec(), b"TEMP:21".to_vec(), b"TEMP:22".to_vec()];

    let payload = codec.encode(&readings).expect("Should encode");
    assert_eq!(payload, b"TEMP:20|TEMP:21|TEMP:22".to_vec());

    let decoded = codec.decode(&payload).expect("Should decode");
    assert_eq!(decoded, readings);
}

/// Test: a single reading has no delimiter on the wire
#[test]
fn test_delimited_single_reading() {
    let codec = DelimitedCodec::new();

    let payload = codec.encode(&[b"TEMP:20".to_vec()]).expect("Should encode");

    assert_eq!(payload, b"TEMP:20".to_vec());
}

/// Test: empty payload decodes to no readings
#[test]
fn test_delimited_empty_payload() {
    let codec = DelimitedCodec::new();

    let decoded = codec.decode(&[]).expect("Should decode");

    assert!(decoded.is_empty());
}

/// Test: a reading containing the delimiter byte is rejected at encode time
#[test]
fn test_delimited_rejects_embedded_delimiter() {
    let codec = DelimitedCodec::new();

    let result = codec.encode(&[b"TEMP:20|EVIL".to_vec()]);

    assert!(matches!(result, Err(CodecError::DelimiterInReading)));
}

// ============================================================================
// RAW CODEC
// ============================================================================

/// Test: raw one-byte samples round-trip
#[test]
fn test_raw_roundtrip() {
    let codec = RawCodec;
    let readings = vec![vec![20], vec![21], vec![255]];

    let payload = codec.encode(&readings).expect("Should encode");
    assert_eq!(payload, vec![20, 21, 255]);

    let decoded = codec.decode(&payload).expect("Should decode");
    assert_eq!(decoded, readings);
}

/// Test: samples wider than one byte are rejected
#[test]
fn test_raw_rejects_wide_samples() {
    let codec = RawCodec;

    let result = codec.encode(&[vec![1, 2]]);

    assert!(matches!(result, Err(CodecError::BadSampleWidth(2))));
}

// ============================================================================
// SEALED CODEC
// ============================================================================

fn test_cipher() -> PayloadCipher {
    PayloadCipher::new([7u8; 32])
}

/// Test: sealed readings round-trip through encrypt + decrypt
#[test]
fn test_sealed_roundtrip() {
    let codec = SealedCodec::new(Box::new(RawCodec), test_cipher());
    let readings = vec![vec![20], vec![21], vec![22]];

    let payload = codec.encode(&readings).expect("Should seal");
    // Sealed payload must not contain the plaintext
    assert_ne!(payload, vec![20, 21, 22]);

    let decoded = codec.decode(&payload).expect("Should open");
    assert_eq!(decoded, readings);
}

/// Test: tampering surfaces as an integrity failure, not garbage readings
#[test]
fn test_sealed_tamper_is_integrity_failure() {
    let codec = SealedCodec::new(Box::new(RawCodec), test_cipher());

    let mut payload = codec.encode(&[vec![20]]).expect("Should seal");
    let last = payload.len() - 1;
    payload[last] ^= 0x01;

    let err = codec.decode(&payload).expect_err("Tampered payload must fail");
    assert!(err.is_integrity_failure());
}
