//! Payload Codec
//!
//! The frame body is a protobuf message with two optional fields:
//!
//! ```text
//! message Payload {
//!   optional string key   = 1;
//!   optional string value = 2;
//! }
//! ```
//!
//! Fields are carried as raw bytes on the Rust side. Protobuf `string` and
//! `bytes` share a wire type, so any client built against the schema above
//! interoperates, and keys or values that are not valid UTF-8 still round-trip.
//!
//! Whether `value` is absent (or empty) is the only thing that separates a
//! read from a write.

use bytes::Bytes;
use prost::Message;

/// The wire payload.
#[derive(Clone, PartialEq, Message)]
pub struct Payload {
    #[prost(bytes = "bytes", optional, tag = "1")]
    pub key: Option<Bytes>,
    #[prost(bytes = "bytes", optional, tag = "2")]
    pub value: Option<Bytes>,
}

impl Payload {
    /// Creates a payload for a read of `key`.
    pub fn get(key: impl Into<Bytes>) -> Self {
        Self {
            key: Some(key.into()),
            value: None,
        }
    }

    /// Creates a payload for a write of `value` under `key`.
    pub fn set(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }

    /// Serializes the payload into a frame body.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.encode_to_vec())
    }

    /// Deserializes a frame body.
    pub fn from_bytes(body: Bytes) -> Result<Self, prost::DecodeError> {
        Self::decode(body)
    }
}

/// A decoded request, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Look up `key`.
    Get { key: Bytes },
    /// Create or replace `key` with `value`. `value` is never empty.
    Set { key: Bytes, value: Bytes },
}

impl Request {
    /// Decodes a frame body into a request.
    pub fn decode(body: Bytes) -> Result<Self, prost::DecodeError> {
        Payload::from_bytes(body).map(Self::from)
    }

    /// Returns the key this request targets.
    pub fn key(&self) -> &Bytes {
        match self {
            Request::Get { key } | Request::Set { key, .. } => key,
        }
    }
}

impl From<Payload> for Request {
    fn from(payload: Payload) -> Self {
        let key = payload.key.unwrap_or_default();
        match payload.value {
            Some(value) if !value.is_empty() => Request::Set { key, value },
            _ => Request::Get { key },
        }
    }
}
