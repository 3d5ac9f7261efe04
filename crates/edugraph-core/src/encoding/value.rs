//! Versioned bincode encoding for stored values.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::traits::{Decoder, Encoder, FORMAT_VERSION};
use crate::error::CoreError;
use crate::types::{Edge, Node};

/// Encode a serde value as `[FORMAT_VERSION][bincode payload]`.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the value cannot be serialized.
pub fn encode_versioned<T: Serialize>(value: &T) -> Result<Vec<u8>, CoreError> {
    let payload = bincode::serde::encode_to_vec(value, bincode::config::standard())
        .map_err(|e| CoreError::Encoding(e.to_string()))?;

    let mut buf = Vec::with_capacity(payload.len() + 1);
    buf.push(FORMAT_VERSION);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode a value written by [`encode_versioned`].
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on empty input, an unknown format version,
/// a malformed payload, or trailing bytes.
pub fn decode_versioned<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CoreError> {
    let (&version, payload) =
        bytes.split_first().ok_or_else(|| CoreError::Encoding("unexpected end of input".to_owned()))?;

    if version != FORMAT_VERSION {
        return Err(CoreError::Encoding(format!(
            "unsupported format version: {version}, expected {FORMAT_VERSION}"
        )));
    }

    let (value, read) = bincode::serde::decode_from_slice(payload, bincode::config::standard())
        .map_err(|e| CoreError::Encoding(e.to_string()))?;

    if read != payload.len() {
        return Err(CoreError::Encoding(format!(
            "trailing bytes after value: {}",
            payload.len() - read
        )));
    }

    Ok(value)
}

impl Encoder for Node {
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_versioned(self)
    }
}

impl Decoder for Node {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_versioned(bytes)
    }
}

impl Encoder for Edge {
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        encode_versioned(self)
    }
}

impl Decoder for Edge {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        decode_versioned(bytes)
    }
}
