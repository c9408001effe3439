// Payload codecs
//
// The payload representation (delimited text, raw binary samples, sealed) is
// a construction-time capability of a sender/receiver pair, not three
// separate protocol variants. Both ends must be built with matching codecs.

use crate::crypto::{CryptoError, PayloadCipher};
use thiserror::Error;

/// Default delimiter between aggregated text readings
pub const READING_DELIMITER: u8 = b'|';

/// A single sensor reading as opaque bytes (UTF-8 in the delimited format,
/// one-byte samples in the raw format).
pub type Reading = Vec<u8>;

/// Errors that can occur encoding or decoding a payload
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Reading contains the delimiter byte")]
    DelimiterInReading,

    #[error("Raw samples must be exactly one byte, got {0}")]
    BadSampleWidth(usize),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl CodecError {
    /// Whether this failure is the security-relevant integrity rejection
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::Crypto(CryptoError::IntegrityFailure))
    }
}

/// Capability for turning buffered readings into payload bytes and back.
pub trait PayloadCodec: Send + Sync {
    /// Aggregate readings into one payload
    fn encode(&self, readings: &[Reading]) -> Result<Vec<u8>, CodecError>;

    /// Split a received payload back into readings
    fn decode(&self, payload: &[u8]) -> Result<Vec<Reading>, CodecError>;
}

// ============================================================================
// DELIMITED TEXT
// ============================================================================

/// UTF-8 text readings joined with a delimiter byte
pub struct DelimitedCodec {
    delimiter: u8,
}

impl DelimitedCodec {
    pub fn new() -> Self {
        Self {
            delimiter: READING_DELIMITER,
        }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl Default for DelimitedCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadCodec for DelimitedCodec {
    fn encode(&self, readings: &[Reading]) -> Result<Vec<u8>, CodecError> {
        let mut payload = Vec::new();
        for (i, reading) in readings.iter().enumerate() {
            if reading.contains(&self.delimiter) {
                return Err(CodecError::DelimiterInReading);
            }
            if i > 0 {
                payload.push(self.delimiter);
            }
            payload.extend_from_slice(reading);
        }
        Ok(payload)
    }

    fn decode(&self, payload: &[u8]) -> Result<Vec<Reading>, CodecError> {
        if payload.is_empty() {
            return Ok(Vec::new());
        }
        Ok(payload
            .split(|b| *b == self.delimiter)
            .map(|part| part.to_vec())
            .collect())
    }
}

// ============================================================================
// RAW BINARY SAMPLES
// ============================================================================

/// One-byte binary samples, concatenated with no framing
pub struct RawCodec;

impl PayloadCodec for RawCodec {
    fn encode(&self, readings: &[Reading]) -> Result<Vec<u8>, CodecError> {
        let mut payload = Vec::with_capacity(readings.len());
        for reading in readings {
            if reading.len() != 1 {
                return Err(CodecError::BadSampleWidth(reading.len()));
            }
            payload.push(reading[0]);
        }
        Ok(payload)
    }

    fn decode(&self, payload: &[u8]) -> Result<Vec<Reading>, CodecError> {
        Ok(payload.iter().map(|b| vec![*b]).collect())
    }
}

// ============================================================================
// SEALED (AUTHENTICATED-ENCRYPTED)
// ============================================================================

/// Decorator that seals an inner codec's payload under a pre-shared key.
/// Decode surfaces tampering as a single opaque integrity failure.
pub struct SealedCodec {
    inner: Box<dyn PayloadCodec>,
    cipher: PayloadCipher,
}

impl SealedCodec {
    pub fn new(inner: Box<dyn PayloadCodec>, cipher: PayloadCipher) -> Self {
        Self { inner, cipher }
    }
}

impl PayloadCodec for SealedCodec {
    fn encode(&self, readings: &[Reading]) -> Result<Vec<u8>, CodecError> {
        let plaintext = self.inner.encode(readings)?;
        Ok(self.cipher.seal(&plaintext)?)
    }

    fn decode(&self, payload: &[u8]) -> Result<Vec<Reading>, CodecError> {
        let plaintext = self.cipher.open(payload)?;
        self.inner.decode(&plaintext)
    }
}
