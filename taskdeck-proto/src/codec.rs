//! Persisted representation of a task collection.
//!
//! A collection is stored as a JSON array of camelCase task records with
//! `createdAt` as an RFC 3339 timestamp, so the stored text stays readable
//! and diffable.

use crate::task::Task;

/// Value stored under a user's initialization marker key.
pub const INITIALIZED_MARKER: &str = "true";

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Encodes a task collection into its stored text form.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the collection cannot be serialized.
pub fn encode_tasks(tasks: &[Task]) -> Result<String, CodecError> {
    serde_json::to_string(tasks).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a task collection from its stored text form.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the text is not a valid collection.
pub fn decode_tasks(text: &str) -> Result<Vec<Task>, CodecError> {
    serde_json::from_str(text).map_err(|e| CodecError::Serialization(e.to_string()))
}
