//! Connection Handler Module
//!
//! This module handles individual client connections to FrameKV.
//! Each accepted socket gets its own handler task, which serves exactly one
//! request and then closes the connection.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned (owned by its task)
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │  AwaitHeader                 │  read exactly 8 bytes
//!    └───────────┬──────────────────┘
//!                ▼
//!    ┌──────────────────────────────┐
//!    │  AwaitBody { expected }      │  read exactly `expected` bytes
//!    └───────────┬──────────────────┘
//!                ▼
//!    ┌──────────────────────────────┐
//!    │  Dispatching                 │  decode payload, get/set
//!    └───────────┬──────────────────┘
//!                ▼
//!    ┌──────────────────────────────┐
//!    │  AwaitFlush                  │  write reply, shut down write half
//!    └───────────┬──────────────────┘
//!                ▼
//! 4. Closed (handler dropped with its task)
//! ```
//!
//! A failure in either read phase skips dispatch entirely: the store is not
//! touched, an `[NOK]` reply is written on a best-effort basis, and the
//! connection closes.
//!
//! ## Reading
//!
//! TCP may split a frame across any number of segments, so each read phase
//! keeps reading until its buffer is full or the peer reaches end-of-stream.
//! Receiving fewer bytes than the phase requires is a framing error.
//!
//! The reply is not framed. Closing the connection is what tells the client
//! the reply is complete, which is also why a connection never serves a
//! second request.

use crate::commands::CommandHandler;
use crate::protocol::{parse_header, FrameError, Request, Response, HEADER_LEN};
use bytes::BytesMut;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total requests dispatched to the store
    pub requests_processed: AtomicU64,
    /// Requests rejected for framing or payload errors
    pub protocol_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn request_processed(&self) {
        self.requests_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written.fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Where a connection is in its request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the fixed-width length header.
    AwaitHeader,
    /// Waiting for a body of the declared length.
    AwaitBody { expected: usize },
    /// Decoding the body and running it against the store.
    Dispatching,
    /// Writing the reply.
    AwaitFlush,
    /// Done; nothing more is read from or written to the socket.
    Closed,
}

/// Handles a single client connection.
///
/// The handler owns the socket and its buffers. It is moved into the task
/// that drives it, so it lives exactly as long as its pending I/O.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: S,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Current protocol phase
    phase: Phase,

    /// Fixed-size header buffer
    header: [u8; HEADER_LEN],

    /// Body buffer, sized from the parsed header
    body: BytesMut,

    /// The command handler (shared store behind it)
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream for this connection
    /// * `addr` - The client's socket address
    /// * `command_handler` - The command handler for executing requests
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream,
            addr,
            phase: Phase::AwaitHeader,
            header: [0; HEADER_LEN],
            body: BytesMut::new(),
            command_handler,
            stats,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Serves one request and closes the connection.
    ///
    /// Returns the error that aborted the request, if any. The client has
    /// already been sent an error reply by the time this returns.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.serve_request().await;

        match &result {
            Ok(()) => debug!(client = %self.addr, "Request served, connection closed"),
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "Connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        self.stats.connection_closed();
        result
    }

    /// Drives the state machine from `AwaitHeader` to `Closed`.
    async fn serve_request(&mut self) -> Result<(), ConnectionError> {
        let (response, failure) = match self.read_request().await {
            Ok(request) => {
                trace!(client = %self.addr, key = ?request.key(), "Dispatching");
                let response = self.command_handler.execute(request);
                self.stats.request_processed();
                (response, None)
            }
            Err(e) => {
                if e.is_protocol() {
                    self.stats.protocol_error();
                }
                debug!(
                    client = %self.addr,
                    phase = ?self.phase,
                    error = %e,
                    "Request aborted"
                );
                (Response::error(e.to_string()), Some(e))
            }
        };

        self.phase = Phase::AwaitFlush;
        let flushed = self.send_response(&response).await;
        self.phase = Phase::Closed;

        match (failure, flushed) {
            (Some(e), Err(write_err)) => {
                debug!(client = %self.addr, error = %write_err, "Error reply not delivered");
                Err(e)
            }
            (Some(e), Ok(())) => Err(e),
            (None, flushed) => flushed,
        }
    }

    /// Reads and decodes one framed request.
    async fn read_request(&mut self) -> Result<Request, ConnectionError> {
        self.phase = Phase::AwaitHeader;
        let received = read_full(&mut self.stream, &mut self.header).await?;
        self.stats.bytes_read(received);
        if received != HEADER_LEN {
            return Err(FrameError::LengthMismatch {
                expected: HEADER_LEN,
                received,
            }
            .into());
        }

        let expected = parse_header(&self.header)?;
        trace!(client = %self.addr, expected, "Parsed header");

        self.phase = Phase::AwaitBody { expected };
        self.body = BytesMut::zeroed(expected);
        let received = read_full(&mut self.stream, &mut self.body).await?;
        self.stats.bytes_read(received);
        if received != expected {
            return Err(FrameError::LengthMismatch { expected, received }.into());
        }

        self.phase = Phase::Dispatching;
        let body = self.body.split().freeze();
        Ok(Request::decode(body)?)
    }

    /// Sends a response to the client and shuts down the write half.
    async fn send_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stream.shutdown().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Reads until `buf` is full or the peer reaches end-of-stream.
///
/// Returns the number of bytes delivered.
async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The frame did not match its header
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The body was not a valid payload
    #[error("invalid payload: {0}")]
    Decode(#[from] prost::DecodeError),
}

impl ConnectionError {
    /// Returns true for errors caused by what the client sent rather than
    /// by the transport.
    pub fn is_protocol(&self) -> bool {
        matches!(self, ConnectionError::Frame(_) | ConnectionError::Decode(_))
    }
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    // Outcome already logged by `run`.
    let _ = handler.run().await;
}
