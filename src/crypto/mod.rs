// Crypto module - authenticated payload encryption

mod cipher;

pub use cipher::*;
