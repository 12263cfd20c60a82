use core::fmt;

use crate::error::ProtocolError;

/// Operation codes a client may place in the header nibble of a request.
///
/// The numeric values are the on-the-wire nibbles (`byte0 >> 4`). Only the
/// five codes below are recognised; any other nibble is treated as an
/// unknown operation and answered with the generic error frame.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum RequestCode {
    /// Return the request payload unchanged (or compressed on request).
    Echo = 0x0,
    /// List the regular files in the served directory.
    DirectoryListing = 0x2,
    /// Report the size of a named file.
    SizeQuery = 0x4,
    /// Read a byte range of a named file, correlated by session id.
    RetrieveFile = 0x6,
    /// Terminate the connection's request loop. No response is sent.
    Shutdown = 0x8,
}

impl RequestCode {
    /// Ordered list of all request codes, by nibble value.
    pub const ALL: [RequestCode; 5] = [
        RequestCode::Echo,
        RequestCode::DirectoryListing,
        RequestCode::SizeQuery,
        RequestCode::RetrieveFile,
        RequestCode::Shutdown,
    ];

    /// Returns the header nibble for this request.
    #[must_use]
    #[inline]
    pub const fn as_nibble(self) -> u8 {
        self as u8
    }

    /// Attempts to construct a [`RequestCode`] from a header nibble.
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0x0 => Some(Self::Echo),
            0x2 => Some(Self::DirectoryListing),
            0x4 => Some(Self::SizeQuery),
            0x6 => Some(Self::RetrieveFile),
            0x8 => Some(Self::Shutdown),
            _ => None,
        }
    }

    /// Returns the response code acknowledging this request, when one exists.
    ///
    /// [`RequestCode::Shutdown`] has no acknowledgment: the connection is
    /// closed without a further frame.
    #[must_use]
    pub const fn response(self) -> Option<ResponseCode> {
        match self {
            RequestCode::Echo => Some(ResponseCode::Echo),
            RequestCode::DirectoryListing => Some(ResponseCode::DirectoryListing),
            RequestCode::SizeQuery => Some(ResponseCode::SizeQuery),
            RequestCode::RetrieveFile => Some(ResponseCode::RetrieveFile),
            RequestCode::Shutdown => None,
        }
    }

    /// Returns a stable mnemonic for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            RequestCode::Echo => "ECHO",
            RequestCode::DirectoryListing => "DIRECTORY_LISTING",
            RequestCode::SizeQuery => "SIZE_QUERY",
            RequestCode::RetrieveFile => "RETRIEVE_FILE",
            RequestCode::Shutdown => "SHUTDOWN",
        }
    }
}

impl fmt::Display for RequestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for RequestCode {
    type Error = ProtocolError;

    fn try_from(nibble: u8) -> Result<Self, ProtocolError> {
        Self::from_nibble(nibble).ok_or(ProtocolError::UnknownRequestCode(nibble))
    }
}

/// Response codes the daemon places in the header nibble of a reply.
///
/// Successful responses set bit 4 of byte 0 plus a per-operation subset of
/// bits 5..7, so every outcome is bit-distinguishable from the requests and
/// from the other responses. The generic error response sets the whole
/// nibble high, discarding any flag state in byte 0.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum ResponseCode {
    /// Echo acknowledgment (bit 4 only).
    Echo = 0x1,
    /// Directory-listing acknowledgment (bits 4 and 5).
    DirectoryListing = 0x3,
    /// Size-query acknowledgment (bits 4 and 6).
    SizeQuery = 0x5,
    /// Retrieve-file acknowledgment (bits 4, 5 and 6).
    ///
    /// A flagless encoding of this nibble is byte-identical to the
    /// duplicate-session error; callers disambiguate by the request they
    /// sent.
    RetrieveFile = 0x7,
    /// Generic error response: whole nibble high, empty payload.
    Error = 0xF,
}

impl ResponseCode {
    /// Ordered list of all response codes, by nibble value.
    pub const ALL: [ResponseCode; 5] = [
        ResponseCode::Echo,
        ResponseCode::DirectoryListing,
        ResponseCode::SizeQuery,
        ResponseCode::RetrieveFile,
        ResponseCode::Error,
    ];

    /// Returns the header nibble for this response.
    #[must_use]
    #[inline]
    pub const fn as_nibble(self) -> u8 {
        self as u8
    }

    /// Attempts to construct a [`ResponseCode`] from a header nibble.
    #[must_use]
    pub const fn from_nibble(nibble: u8) -> Option<Self> {
        match nibble {
            0x1 => Some(Self::Echo),
            0x3 => Some(Self::DirectoryListing),
            0x5 => Some(Self::SizeQuery),
            0x7 => Some(Self::RetrieveFile),
            0xF => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns a stable mnemonic for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ResponseCode::Echo => "ECHO_OK",
            ResponseCode::DirectoryListing => "DIRECTORY_LISTING_OK",
            ResponseCode::SizeQuery => "SIZE_QUERY_OK",
            ResponseCode::RetrieveFile => "RETRIEVE_FILE_OK",
            ResponseCode::Error => "ERROR",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
