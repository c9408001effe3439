// Configuration Tests

use ecolink::config::{ConfigError, PayloadFormat, ProtocolConfig};

/// Test: the default configuration validates
#[test]
fn test_default_validates() {
    assert!(ProtocolConfig::default().validate().is_ok());
}

/// Test: builder setters land where they should
#[test]
fn test_builder() {
    let config = ProtocolConfig::new()
        .with_listen_address("0.0.0.0:6000")
        .with_target_address("10.0.0.1:6000")
        .with_initial_capacity(42.0)
        .with_drain_rates(0.1, 3.0)
        .with_base_ack_timeout_ms(250)
        .with_loss_probability(0.2)
        .with_payload_format(PayloadFormat::Sealed)
        .with_reading_interval_ms(100);

    assert_eq!(config.listen_address, "0.0.0.0:6000");
    assert_eq!(config.target_address, "10.0.0.1:6000");
    assert_eq!(config.initial_capacity, 42.0);
    assert_eq!(config.idle_drain_per_sec, 0.1);
    assert_eq!(config.tx_drain_base, 3.0);
    assert_eq!(config.base_ack_timeout_ms, 250);
    assert_eq!(config.loss_probability, 0.2);
    assert_eq!(config.payload_format, PayloadFormat::Sealed);
    assert_eq!(config.reading_interval_ms, 100);
    assert!(config.validate().is_ok());
}

/// Test: out-of-range values are rejected
#[test]
fn test_invalid_values_rejected() {
    let bad_capacity = ProtocolConfig::new().with_initial_capacity(0.0);
    assert!(matches!(bad_capacity.validate(), Err(ConfigError::InvalidCapacity)));

    let bad_loss = ProtocolConfig::new().with_loss_probability(1.5);
    assert!(matches!(bad_loss.validate(), Err(ConfigError::InvalidLossProbability)));

    let bad_timeout = ProtocolConfig::new().with_base_ack_timeout_ms(0);
    assert!(matches!(bad_timeout.validate(), Err(ConfigError::InvalidTimeout)));

    let bad_drain = ProtocolConfig::new().with_drain_rates(-0.1, 2.0);
    assert!(matches!(bad_drain.validate(), Err(ConfigError::InvalidDrainRate)));
}

/// Test: a sealed configuration requires a usable key
#[test]
fn test_sealed_requires_valid_key() {
    let config = ProtocolConfig::new()
        .with_payload_format(PayloadFormat::Sealed)
        .with_key_hex("deadbeef");

    assert!(matches!(config.validate(), Err(ConfigError::InvalidKey(_))));
    assert!(config.build_codec().is_err());
}

/// Test: a codec can be built for every format
#[test]
fn test_build_codec_all_formats() {
    for format in [PayloadFormat::Delimited, PayloadFormat::Raw, PayloadFormat::Sealed] {
        let config = ProtocolConfig::new().with_payload_format(format);
        assert!(config.build_codec().is_ok(), "Codec must build for {:?}", format);
    }
}
