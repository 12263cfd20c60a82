use thiserror::Error;

use crate::frame::HEADER_LEN;

/// Failures encountered while parsing or constructing wire frames.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ProtocolError {
    /// Fewer than [`HEADER_LEN`] bytes were available for a header.
    #[error("frame header truncated: expected {HEADER_LEN} bytes, got {actual}")]
    TruncatedHeader {
        /// Number of bytes that were available.
        actual: usize,
    },
    /// The payload on hand is shorter than the header's length field.
    #[error("frame payload truncated: header declares {declared} bytes, got {actual}")]
    TruncatedPayload {
        /// Payload length declared by the header.
        declared: u64,
        /// Number of payload bytes actually available.
        actual: usize,
    },
    /// The declared payload length exceeds [`MAX_PAYLOAD_LEN`] or this
    /// platform's `usize`.
    ///
    /// [`MAX_PAYLOAD_LEN`]: crate::MAX_PAYLOAD_LEN
    #[error("frame payload length {0} exceeds the frame limit")]
    OversizedPayload(u64),
    /// The header nibble is not one of the five assigned request codes.
    #[error("unknown request code nibble {0:#x}")]
    UnknownRequestCode(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_truncated_header() {
        let err = ProtocolError::TruncatedHeader { actual: 3 };
        assert_eq!(
            err.to_string(),
            "frame header truncated: expected 9 bytes, got 3"
        );
    }

    #[test]
    fn display_formats_truncated_payload() {
        let err = ProtocolError::TruncatedPayload {
            declared: 64,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "frame payload truncated: header declares 64 bytes, got 12"
        );
    }

    #[test]
    fn display_formats_unknown_request_code() {
        let err = ProtocolError::UnknownRequestCode(0xA);
        assert_eq!(err.to_string(), "unknown request code nibble 0xa");
    }
}
