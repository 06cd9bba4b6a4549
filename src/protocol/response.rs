//! Response Types
//!
//! A request is answered by exactly one of three kinds of reply:
//!
//! - `Ok`: `[OK] : <text>`
//! - `Error`: `[NOK] : <text>`
//! - `Message`: the raw stored value, no prefix
//!
//! Replies are not length-prefixed. The server closes the connection after
//! writing one, and that close is the only delimiter a client gets.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Prefix of a successful status reply.
pub const OK_PREFIX: &str = "[OK] : ";

/// Prefix of an error reply.
pub const ERROR_PREFIX: &str = "[NOK] : ";

/// Default text of a successful write.
pub const OPERATION_COMPLETED: &str = "Operation completed.";

/// Text sent when a read misses.
pub const KEY_NOT_FOUND: &str = "Key not found in DB.";

/// A reply to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The operation succeeded.
    Ok(String),
    /// The operation failed.
    Error(String),
    /// A stored value, sent back as-is.
    Message(Bytes),
}

impl Response {
    /// Creates the default success reply.
    pub fn ok() -> Self {
        Response::Ok(OPERATION_COMPLETED.to_string())
    }

    /// Creates an error reply.
    pub fn error(text: impl Into<String>) -> Self {
        Response::Error(text.into())
    }

    /// Creates a value reply.
    pub fn message(value: Bytes) -> Self {
        Response::Message(value)
    }

    /// Returns true for `Error` replies.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }

    /// Serializes the reply to the bytes written on the wire.
    ///
    /// # Example
    /// ```
    /// use framekv::protocol::Response;
    /// assert_eq!(&Response::ok().serialize()[..], b"[OK] : Operation completed.");
    /// ```
    pub fn serialize(&self) -> Bytes {
        match self {
            Response::Ok(text) => prefixed(OK_PREFIX, text),
            Response::Error(text) => prefixed(ERROR_PREFIX, text),
            Response::Message(value) => value.clone(),
        }
    }

    /// Interprets the bytes of a reply.
    ///
    /// A stored value that happens to start with one of the status prefixes
    /// cannot be told apart from a status reply; it is reported as the status.
    pub fn parse(reply: Bytes) -> Self {
        if let Some(text) = reply.strip_prefix(OK_PREFIX.as_bytes()) {
            Response::Ok(String::from_utf8_lossy(text).into_owned())
        } else if let Some(text) = reply.strip_prefix(ERROR_PREFIX.as_bytes()) {
            Response::Error(String::from_utf8_lossy(text).into_owned())
        } else {
            Response::Message(reply)
        }
    }
}

fn prefixed(prefix: &str, text: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(prefix.len() + text.len());
    buf.put_slice(prefix.as_bytes());
    buf.put_slice(text.as_bytes());
    buf.freeze()
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok(text) => write!(f, "{OK_PREFIX}{text}"),
            Response::Error(text) => write!(f, "{ERROR_PREFIX}{text}"),
            Response::Message(value) => write!(f, "{}", String::from_utf8_lossy(value)),
        }
    }
}
