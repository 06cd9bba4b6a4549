//! Frame Header Encoding and Parsing
//!
//! Every request on the wire is a single frame:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────────┐
//! │ header (8 bytes)     │ body (header value bytes)        │
//! │ ASCII decimal digits │ protobuf-encoded Payload         │
//! │ e.g. "00000014"      │                                  │
//! └──────────────────────┴──────────────────────────────────┘
//! ```
//!
//! The header is the body length written as decimal digits, left-padded
//! with `'0'` to exactly [`HEADER_LEN`] bytes. Eight digits put a natural
//! ceiling of [`MAX_BODY_LEN`] on a single body; nothing else caps it.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Width of the frame header in bytes.
pub const HEADER_LEN: usize = 8;

/// Largest body length an eight-digit header can declare.
pub const MAX_BODY_LEN: usize = 99_999_999;

/// Errors raised while framing a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The peer delivered fewer (or more) bytes than the frame required.
    ///
    /// The display text is part of the wire contract and is sent back
    /// verbatim in the error reply.
    #[error("wrong number of bytes received")]
    LengthMismatch { expected: usize, received: usize },

    /// The header contained something other than ASCII digits.
    #[error("invalid frame header: {0:?}")]
    InvalidHeader(String),

    /// The body is longer than an eight-digit header can express.
    #[error("body too large: {size} bytes (max: {max})")]
    BodyTooLarge { size: usize, max: usize },
}

/// Parses a header into the declared body length.
///
/// # Example
///
/// ```
/// use framekv::protocol::frame::parse_header;
///
/// assert_eq!(parse_header(b"00000014").unwrap(), 14);
/// assert!(parse_header(b"0000001x").is_err());
/// ```
pub fn parse_header(header: &[u8; HEADER_LEN]) -> Result<usize, FrameError> {
    header.iter().try_fold(0usize, |len, &byte| {
        if byte.is_ascii_digit() {
            Ok(len * 10 + usize::from(byte - b'0'))
        } else {
            Err(FrameError::InvalidHeader(
                String::from_utf8_lossy(header).into_owned(),
            ))
        }
    })
}

/// Encodes a body length as a zero-padded header.
pub fn encode_header(body_len: usize) -> Result<[u8; HEADER_LEN], FrameError> {
    if body_len > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLarge {
            size: body_len,
            max: MAX_BODY_LEN,
        });
    }

    let mut header = [b'0'; HEADER_LEN];
    let digits = body_len.to_string();
    header[HEADER_LEN - digits.len()..].copy_from_slice(digits.as_bytes());
    Ok(header)
}

/// Builds a complete frame (header followed by body).
pub fn encode_frame(body: &[u8]) -> Result<Bytes, FrameError> {
    let header = encode_header(body.len())?;
    let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
    buf.put_slice(&header);
    buf.put_slice(body);
    Ok(buf.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_header_pads_with_zeros() {
        assert_eq!(&encode_header(14).unwrap(), b"00000014");
        assert_eq!(&encode_header(0).unwrap(), b"00000000");
        assert_eq!(&encode_header(MAX_BODY_LEN).unwrap(), b"99999999");
    }

    #[test]
    fn test_encode_header_too_large() {
        assert_eq!(
            encode_header(MAX_BODY_LEN + 1),
            Err(FrameError::BodyTooLarge {
                size: MAX_BODY_LEN + 1,
                max: MAX_BODY_LEN
            })
        );
    }

    #[test]
    fn test_parse_header() {
        assert_eq!(parse_header(b"00000000").unwrap(), 0);
        assert_eq!(parse_header(b"00000100").unwrap(), 100);
        assert_eq!(parse_header(b"12345678").unwrap(), 12_345_678);
    }

    #[test]
    fn test_parse_header_rejects_non_digits() {
        assert!(matches!(
            parse_header(b"    0014"),
            Err(FrameError::InvalidHeader(_))
        ));
        assert!(matches!(
            parse_header(&[0, 0, 0, 2, 0xDE, 0xAD, 0xBE, 0xEF]),
            Err(FrameError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_encode_frame() {
        let frame = encode_frame(b"abc").unwrap();
        assert_eq!(&frame[..], b"00000003abc");
    }

    #[test]
    fn test_length_mismatch_message() {
        let err = FrameError::LengthMismatch {
            expected: 100,
            received: 10,
        };
        assert_eq!(err.to_string(), "wrong number of bytes received");
    }
}
