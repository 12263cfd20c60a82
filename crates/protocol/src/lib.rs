#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `ferry_protocol` implements the fixed-header wire format spoken by the
//! ferry file-transfer daemon. Every message on the socket is a single
//! frame: a 9-byte header followed by an arbitrary payload. The header
//! carries the operation (or response) code in the high nibble of byte 0,
//! two compression flags in the low nibble, and a big-endian 64-bit
//! payload length in bytes 1..9.
//!
//! # Design
//!
//! The crate separates the code tables ([`RequestCode`], [`ResponseCode`])
//! from the header codec ([`FrameHeader`]) and the owned message type
//! ([`Frame`]). Decoding never fails on an unrecognised operation nibble;
//! instead the header records the raw nibble and forces the payload length
//! to zero so the daemon can answer with the generic error frame while the
//! connection keeps serving requests.
//!
//! # Invariants
//!
//! - An encoded header's length field is always derived from the payload
//!   actually being sent, never copied from an incoming frame.
//! - A header whose operation nibble is unknown always reports a payload
//!   length of zero, regardless of the bytes on the wire.
//! - A declared payload length above [`MAX_PAYLOAD_LEN`] never sizes a
//!   buffer: [`FrameHeader::payload_len_usize`] rejects it before any
//!   allocation happens.
//! - The duplicate-session response byte (`0x70`) is bit-identical to a
//!   flagless successful retrieve response. The collision is part of the
//!   wire format; see [`Frame::duplicate_session`].

mod code;
mod error;
mod frame;

pub use code::{RequestCode, ResponseCode};
pub use error::ProtocolError;
pub use frame::{Frame, FrameHeader, HEADER_LEN, MAX_PAYLOAD_LEN};
