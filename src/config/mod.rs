// Configuration surface
//
// Everything here is plain configuration, not protocol logic: addresses,
// the pre-shared key, battery parameters, timing, and the simulated loss
// probability. Construction-time only; nothing reads config at runtime.

use crate::crypto::PayloadCipher;
use crate::packet::{DelimitedCodec, PayloadCodec, RawCodec, SealedCodec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Demo pre-shared key (the PoC "burned-in" key); real deployments override
pub const DEFAULT_KEY_HEX: &str =
    "0102030405060708010203040506070801020304050607080102030405060708";

/// Errors that can occur validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Initial battery capacity must be positive")]
    InvalidCapacity,

    #[error("Drain rates must be non-negative")]
    InvalidDrainRate,

    #[error("Loss probability must be within [0, 1]")]
    InvalidLossProbability,

    #[error("Base ACK timeout must be positive")]
    InvalidTimeout,

    #[error("Invalid pre-shared key: {0}")]
    InvalidKey(String),
}

/// Which payload codec a sender/receiver pair is built with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum PayloadFormat {
    /// UTF-8 readings joined with '|'
    Delimited,
    /// One-byte binary samples
    Raw,
    /// One-byte binary samples, authenticated-encrypted
    Sealed,
}

/// Configuration for one sender/receiver pair
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Receiver listening address
    pub listen_address: String,
    /// Address the sender transmits to
    pub target_address: String,
    /// 256-bit pre-shared key, hex encoded (used by the sealed format)
    pub key_hex: String,
    /// Battery capacity in simulation units
    pub initial_capacity: f64,
    /// Background drain per second of uptime
    pub idle_drain_per_sec: f64,
    /// Cost of one radio wake-up; retries add half of this each
    pub tx_drain_base: f64,
    /// Initial ACK wait in milliseconds; doubles per retry
    pub base_ack_timeout_ms: u64,
    /// Probability that a sent datagram silently never reaches the wire
    pub loss_probability: f64,
    /// Payload representation for both ends
    pub payload_format: PayloadFormat,
    /// Idle pause between sensor readings in milliseconds
    pub reading_interval_ms: u64,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:5005".to_string(),
            target_address: "127.0.0.1:5005".to_string(),
            key_hex: DEFAULT_KEY_HEX.to_string(),
            initial_capacity: 100.0,
            idle_drain_per_sec: 0.05,
            tx_drain_base: 2.0,
            base_ack_timeout_ms: 500,
            loss_probability: 0.0,
            payload_format: PayloadFormat::Delimited,
            reading_interval_ms: 50,
        }
    }
}

impl ProtocolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listen_address(mut self, address: &str) -> Self {
        self.listen_address = address.to_string();
        self
    }

    pub fn with_target_address(mut self, address: &str) -> Self {
        self.target_address = address.to_string();
        self
    }

    pub fn with_key_hex(mut self, key_hex: &str) -> Self {
        self.key_hex = key_hex.to_string();
        self
    }

    pub fn with_initial_capacity(mut self, capacity: f64) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_drain_rates(mut self, idle_per_sec: f64, tx_base: f64) -> Self {
        self.idle_drain_per_sec = idle_per_sec;
        self.tx_drain_base = tx_base;
        self
    }

    pub fn with_base_ack_timeout_ms(mut self, ms: u64) -> Self {
        self.base_ack_timeout_ms = ms;
        self
    }

    pub fn with_loss_probability(mut self, probability: f64) -> Self {
        self.loss_probability = probability;
        self
    }

    pub fn with_payload_format(mut self, format: PayloadFormat) -> Self {
        self.payload_format = format;
        self
    }

    pub fn with_reading_interval_ms(mut self, ms: u64) -> Self {
        self.reading_interval_ms = ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capacity <= 0.0 {
            return Err(ConfigError::InvalidCapacity);
        }
        if self.idle_drain_per_sec < 0.0 || self.tx_drain_base < 0.0 {
            return Err(ConfigError::InvalidDrainRate);
        }
        if !(0.0..=1.0).contains(&self.loss_probability) {
            return Err(ConfigError::InvalidLossProbability);
        }
        if self.base_ack_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if matches!(self.payload_format, PayloadFormat::Sealed) {
            PayloadCipher::from_hex(&self.key_hex)
                .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        }
        Ok(())
    }

    /// Construct the payload codec this configuration describes. Both ends
    /// of a pair must be built from equivalent configuration.
    pub fn build_codec(&self) -> Result<Box<dyn PayloadCodec>, ConfigError> {
        match self.payload_format {
            PayloadFormat::Delimited => Ok(Box::new(DelimitedCodec::new())),
            PayloadFormat::Raw => Ok(Box::new(RawCodec)),
            PayloadFormat::Sealed => {
                let cipher = PayloadCipher::from_hex(&self.key_hex)
                    .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
                Ok(Box::new(SealedCodec::new(Box::new(RawCodec), cipher)))
            }
        }
    }
}
