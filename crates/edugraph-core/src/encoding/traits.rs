//! Encoding and decoding traits for serialization.

use crate::CoreError;

/// A trait for types that can be encoded to bytes.
pub trait Encoder: Sized {
    /// Encode this value to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode(&self) -> Result<Vec<u8>, CoreError>;
}

/// A trait for types that can be decoded from bytes.
pub trait Decoder: Sized {
    /// Decode a value from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails (e.g., invalid data, truncated input,
    /// unknown format version).
    fn decode(bytes: &[u8]) -> Result<Self, CoreError>;
}

/// Format version for serialized data.
///
/// This version number is embedded in serialized data to support
/// forward-compatible schema evolution.
pub const FORMAT_VERSION: u8 = 1;
