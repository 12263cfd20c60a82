use crate::code::{RequestCode, ResponseCode};
use crate::error::ProtocolError;

/// Size of the fixed frame header in bytes.
pub const HEADER_LEN: usize = 9;

/// Largest payload length a header may declare: 1 GiB.
///
/// The length field is wide enough to address the whole 64-bit range, so
/// an unchecked declared length would let a single hostile header drive
/// an arbitrarily large allocation. Anything above this bound is rejected
/// before any buffer is sized from it.
pub const MAX_PAYLOAD_LEN: u64 = 1 << 30;

/// Byte 0 bit 2: the peer asks for the response payload to be compressed.
const FLAG_REQUEST_COMPRESS: u8 = 1 << 2;
/// Byte 0 bit 3: the payload of this frame is compressed.
const FLAG_COMPRESSED: u8 = 1 << 3;

/// A decoded 9-byte frame header.
///
/// Byte 0 packs the operation nibble (`byte0 >> 4`) together with the
/// [`compressed`](Self::compressed) and
/// [`request_compress`](Self::request_compress) flags; bytes 1..9 hold the
/// payload length as a big-endian `u64`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FrameHeader {
    nibble: u8,
    compressed: bool,
    request_compress: bool,
    payload_len: u64,
}

impl FrameHeader {
    /// Parses a header from the beginning of `bytes`.
    ///
    /// Decoding is performed from the daemon's point of view: when the
    /// operation nibble is not one of the five assigned request codes the
    /// header is treated as headers-only and the payload length is forced
    /// to zero, regardless of the length field on the wire.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < HEADER_LEN {
            return Err(ProtocolError::TruncatedHeader {
                actual: bytes.len(),
            });
        }

        let nibble = bytes[0] >> 4;
        let mut length = [0u8; 8];
        length.copy_from_slice(&bytes[1..HEADER_LEN]);
        let mut payload_len = u64::from_be_bytes(length);
        if RequestCode::from_nibble(nibble).is_none() {
            payload_len = 0;
        }

        Ok(Self {
            nibble,
            compressed: bytes[0] & FLAG_COMPRESSED != 0,
            request_compress: bytes[0] & FLAG_REQUEST_COMPRESS != 0,
            payload_len,
        })
    }

    /// Encodes this header into its 9-byte wire representation.
    #[must_use]
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.nibble << 4;
        if self.compressed {
            out[0] |= FLAG_COMPRESSED;
        }
        if self.request_compress {
            out[0] |= FLAG_REQUEST_COMPRESS;
        }
        out[1..HEADER_LEN].copy_from_slice(&self.payload_len.to_be_bytes());
        out
    }

    /// Returns the request code carried by this header, when recognised.
    #[must_use]
    pub const fn request(&self) -> Option<RequestCode> {
        RequestCode::from_nibble(self.nibble)
    }

    /// Returns the raw operation nibble (`byte0 >> 4`).
    #[must_use]
    #[inline]
    pub const fn nibble(&self) -> u8 {
        self.nibble
    }

    /// Reports whether the frame payload is compressed.
    #[must_use]
    #[inline]
    pub const fn compressed(&self) -> bool {
        self.compressed
    }

    /// Reports whether the peer asked for a compressed response.
    #[must_use]
    #[inline]
    pub const fn request_compress(&self) -> bool {
        self.request_compress
    }

    /// Returns the payload length declared by this header.
    #[must_use]
    #[inline]
    pub const fn payload_len(&self) -> u64 {
        self.payload_len
    }

    /// Returns the payload length as a `usize`, failing when the declared
    /// length exceeds [`MAX_PAYLOAD_LEN`] or cannot be addressed on this
    /// platform.
    pub fn payload_len_usize(&self) -> Result<usize, ProtocolError> {
        if self.payload_len > MAX_PAYLOAD_LEN {
            return Err(ProtocolError::OversizedPayload(self.payload_len));
        }
        usize::try_from(self.payload_len)
            .map_err(|_| ProtocolError::OversizedPayload(self.payload_len))
    }
}

/// An owned protocol message: header state plus payload bytes.
///
/// The payload length field is never stored; [`Frame::to_bytes`] derives it
/// from the payload actually carried, so a frame can never advertise a
/// length it does not have.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Frame {
    nibble: u8,
    compressed: bool,
    request_compress: bool,
    payload: Vec<u8>,
}

impl Frame {
    /// Builds a request frame with both flags cleared.
    #[must_use]
    pub fn request(code: RequestCode, payload: Vec<u8>) -> Self {
        Self {
            nibble: code.as_nibble(),
            compressed: false,
            request_compress: false,
            payload,
        }
    }

    /// Builds a successful response frame with both flags cleared.
    #[must_use]
    pub fn response(code: ResponseCode, payload: Vec<u8>) -> Self {
        Self {
            nibble: code.as_nibble(),
            compressed: false,
            request_compress: false,
            payload,
        }
    }

    /// Builds the generic error response: nibble `0xF`, no flags, empty
    /// payload. Byte 0 of the encoding is always exactly `0xF0`.
    #[must_use]
    pub fn error() -> Self {
        Self::response(ResponseCode::Error, Vec::new())
    }

    /// Builds the duplicate-session error response.
    ///
    /// Byte 0 is the literal `0x70`: the same byte a flagless successful
    /// [`ResponseCode::RetrieveFile`] acknowledgment with an empty payload
    /// would carry. The collision is preserved for wire compatibility;
    /// peers disambiguate by the request that produced the response.
    #[must_use]
    pub fn duplicate_session() -> Self {
        Self::response(ResponseCode::RetrieveFile, Vec::new())
    }

    /// Parses a complete frame from `bytes`.
    ///
    /// The inverse of [`Frame::to_bytes`]: the header is decoded and the
    /// declared payload must be fully present. Trailing bytes beyond the
    /// declared length are ignored.
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let header = FrameHeader::decode(bytes)?;
        let len = header.payload_len_usize()?;
        let available = bytes.len() - HEADER_LEN;
        if available < len {
            return Err(ProtocolError::TruncatedPayload {
                declared: header.payload_len,
                actual: available,
            });
        }

        Ok(Self {
            nibble: header.nibble,
            compressed: header.compressed,
            request_compress: header.request_compress,
            payload: bytes[HEADER_LEN..HEADER_LEN + len].to_vec(),
        })
    }

    /// Sets the `compressed` flag.
    #[must_use]
    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    /// Sets the `request_compress` flag.
    #[must_use]
    pub fn with_request_compress(mut self, request_compress: bool) -> Self {
        self.request_compress = request_compress;
        self
    }

    /// Returns the header describing this frame.
    #[must_use]
    pub fn header(&self) -> FrameHeader {
        FrameHeader {
            nibble: self.nibble,
            compressed: self.compressed,
            request_compress: self.request_compress,
            payload_len: self.payload.len() as u64,
        }
    }

    /// Returns the payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the frame and returns its payload.
    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Encodes the frame as header plus payload, ready to write to a socket.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.payload.len());
        out.extend_from_slice(&self.header().encode());
        out.extend_from_slice(&self.payload);
        out
    }
}
