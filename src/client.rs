//! FrameKV Client
//!
//! Speaks the same framing contract as the server: every call opens a fresh
//! connection, writes a single frame, and reads the reply until the server
//! closes the connection.
//!
//! ```ignore
//! use framekv::client::Client;
//! use framekv::protocol::Response;
//!
//! let client = Client::new("127.0.0.1:12345");
//! assert_eq!(client.set("a", "b").await?, Response::ok());
//! assert_eq!(client.get("a").await?, Response::message("b".into()));
//! ```

use crate::protocol::{encode_frame, FrameError, Payload, Response};
use bytes::Bytes;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::trace;

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// I/O error talking to the server
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request could not be framed
    #[error("framing error: {0}")]
    Frame(#[from] FrameError),
}

/// A FrameKV client bound to one server address.
#[derive(Debug, Clone)]
pub struct Client {
    addr: String,
}

impl Client {
    /// Creates a client for the server at `addr` (`host:port`).
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }

    /// Returns the server address this client talks to.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Reads the value stored under `key`.
    pub async fn get(&self, key: impl Into<Bytes>) -> Result<Response, ClientError> {
        self.send(&Payload::get(key)).await
    }

    /// Stores `value` under `key`.
    ///
    /// An empty `value` turns the request into a read.
    pub async fn set(
        &self,
        key: impl Into<Bytes>,
        value: impl Into<Bytes>,
    ) -> Result<Response, ClientError> {
        self.send(&Payload::set(key, value)).await
    }

    /// Frames and sends a payload.
    pub async fn send(&self, payload: &Payload) -> Result<Response, ClientError> {
        let frame = encode_frame(&payload.to_bytes())?;
        let reply = self.send_raw(&frame).await?;
        Ok(Response::parse(reply))
    }

    /// Sends `bytes` verbatim and returns the raw reply.
    ///
    /// The write half is closed after sending, so a truncated frame is seen
    /// by the server as a short read rather than a stalled one.
    pub async fn send_raw(&self, bytes: &[u8]) -> Result<Bytes, ClientError> {
        let mut stream = TcpStream::connect(&self.addr).await?;
        stream.write_all(bytes).await?;
        stream.shutdown().await?;

        let mut reply = Vec::new();
        stream.read_to_end(&mut reply).await?;
        trace!(addr = %self.addr, sent = bytes.len(), received = reply.len(), "Round trip");

        Ok(Bytes::from(reply))
    }
}
