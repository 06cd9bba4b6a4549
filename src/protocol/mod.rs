//! Wire Protocol Implementation
//!
//! This module covers everything that crosses the socket.
//!
//! ## Overview
//!
//! A client sends one frame: an 8-byte ASCII-decimal length header followed by
//! a protobuf payload of exactly that many bytes. The server answers with an
//! unframed text reply and closes the connection.
//!
//! ## Modules
//!
//! - `frame`: Header encoding/parsing and framing errors
//! - `codec`: The protobuf `Payload` and the decoded `Request`
//! - `response`: The `Response` sum type and its wire text
//!
//! ## Example
//!
//! ```
//! use framekv::protocol::{encode_frame, Payload, Request, Response};
//! use bytes::Bytes;
//!
//! // Building a request frame
//! let body = Payload::set("name", "Ariz").to_bytes();
//! let frame = encode_frame(&body).unwrap();
//! assert_eq!(&frame[..8], b"00000012");
//!
//! // Decoding the body on the server side
//! let request = Request::decode(frame.slice(8..)).unwrap();
//! assert!(matches!(request, Request::Set { .. }));
//!
//! // Creating responses
//! let response = Response::message(Bytes::from("Ariz"));
//! assert_eq!(&response.serialize()[..], b"Ariz");
//! ```

pub mod codec;
pub mod frame;
pub mod response;

// Re-export commonly used types for convenience
pub use codec::{Payload, Request};
pub use frame::{
    encode_frame, encode_header, parse_header, FrameError, HEADER_LEN, MAX_BODY_LEN,
};
pub use response::Response;
