// Payload cipher
//
// ChaCha20-Poly1305 under a 256-bit pre-shared key. Sealed layout on the
// wire: 12-byte nonce || ciphertext || 16-byte tag. No associated data is
// bound, so header fields are not tamper-protected (a deliberate protocol
// simplification). Every verification failure collapses into one opaque
// integrity error so the layer cannot be used as a decryption oracle.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{AeadCore, ChaCha20Poly1305, Key, Nonce};
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

/// Pre-shared key length in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Per-message nonce length in bytes
pub const NONCE_SIZE: usize = 12;

/// Authentication tag length in bytes
pub const TAG_SIZE: usize = 16;

/// Errors that can occur in the crypto layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Invalid pre-shared key: {0}")]
    InvalidKey(String),

    #[error("Sealed payload too short to contain a nonce")]
    Malformed,

    #[error("Encryption failed")]
    SealFailed,

    /// Wrong key, truncation, or tampering. Causes are deliberately not
    /// distinguished.
    #[error("Payload failed integrity verification")]
    IntegrityFailure,
}

/// Authenticated encryption of payload bytes under a pre-shared key
pub struct PayloadCipher {
    cipher: ChaCha20Poly1305,
}

impl PayloadCipher {
    /// Build a cipher from raw key bytes.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
        }
    }

    /// Build a cipher from a 64-character hex string (configuration form).
    pub fn from_hex(key_hex: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(key_hex).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let key: [u8; KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKey(format!("expected {} bytes", KEY_SIZE)))?;
        Ok(Self::new(key))
    }

    /// Encrypt and authenticate `plaintext`, prepending a fresh random
    /// nonce. A nonce is never reused under a given key.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| CryptoError::SealFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(nonce.as_slice());
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Verify and decrypt a sealed payload. Yields either the exact original
    /// plaintext or an error; garbage is never surfaced.
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < NONCE_SIZE {
            return Err(CryptoError::Malformed);
        }

        let nonce = Nonce::from_slice(&sealed[..NONCE_SIZE]);
        self.cipher
            .decrypt(nonce, &sealed[NONCE_SIZE..])
            .map_err(|_| CryptoError::IntegrityFailure)
    }
}

impl fmt::Debug for PayloadCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print key material
        f.write_str("PayloadCipher")
    }
}
