//! JSON encoding of persisted snapshots.
//!
//! A snapshot is stored as a single compact JSON document. Field names and
//! array order are part of the wire contract, so a decode of an encode yields
//! an equal value.

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Errors from encoding or decoding a snapshot
#[derive(Error, Debug)]
pub enum CodecError {
    /// The snapshot could not be serialized
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The stored blob is not a valid snapshot
    #[error("Failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Serialize a snapshot to its stored form
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails (e.g. a map with
/// non-string keys).
pub fn encode<T: Serialize + ?Sized>(snapshot: &T) -> Result<String, CodecError> {
    serde_json::to_string(snapshot).map_err(CodecError::Encode)
}

/// Parse a stored blob back into a snapshot
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the blob is not valid JSON or does not
/// match the snapshot's shape.
pub fn decode<T: DeserializeOwned>(blob: &str) -> Result<T, CodecError> {
    serde_json::from_str(blob).map_err(CodecError::Decode)
}
