use std::fs;
use std::path::Path;

use crate::bits::BitReader;
use crate::error::DictionaryError;

/// Number of symbols a dictionary covers: one per byte value.
pub const DICT_SYMBOLS: usize = 256;

/// A single symbol's bit code: up to 32 bits packed into the low end of a
/// `u32`, most-significant code bit highest.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Code {
    bits: u32,
    len: u8,
}

impl Code {
    /// Longest code length a dictionary entry may declare.
    pub const MAX_LEN: u8 = 32;

    /// Creates a code from its packed bits and bit length.
    #[must_use]
    pub const fn new(bits: u32, len: u8) -> Self {
        Self { bits, len }
    }

    /// Returns the packed code bits.
    #[must_use]
    #[inline]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Returns the code length in bits.
    #[must_use]
    #[inline]
    pub const fn len(self) -> u8 {
        self.len
    }

    /// Reports whether this is a zero-length code.
    #[must_use]
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }
}

/// The static 256-symbol code table used for compression.
///
/// Loaded once at startup and shared read-only across all connections.
/// Decoding is only unambiguous when the codes are prefix-free across all
/// 256 entries; that is a property of the external resource and is not
/// checked at load time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dictionary {
    codes: [Code; DICT_SYMBOLS],
}

impl Dictionary {
    /// Loads a dictionary from the resource file at `path`.
    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let resource = fs::read(path).map_err(|source| DictionaryError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&resource)
    }

    /// Parses a dictionary from its packed binary representation.
    ///
    /// The resource is one continuous bit stream, most-significant bit
    /// first: for each of the 256 symbols in ascending order, an 8-bit
    /// code length followed by that many code bits.
    pub fn from_bytes(resource: &[u8]) -> Result<Self, DictionaryError> {
        let mut reader = BitReader::new(resource);
        let mut codes = [Code::default(); DICT_SYMBOLS];

        for (symbol, slot) in codes.iter_mut().enumerate() {
            let len = reader
                .read_bits(8)
                .ok_or(DictionaryError::Truncated { symbol })? as u8;
            if len > Code::MAX_LEN {
                return Err(DictionaryError::CodeTooLong { symbol, bits: len });
            }
            let bits = reader
                .read_bits(len)
                .ok_or(DictionaryError::Truncated { symbol })?;
            *slot = Code::new(bits, len);
        }

        Ok(Self { codes })
    }

    /// Builds a dictionary directly from 256 `(bits, len)` pairs.
    pub fn from_codes(codes: [(u32, u8); DICT_SYMBOLS]) -> Result<Self, DictionaryError> {
        let mut table = [Code::default(); DICT_SYMBOLS];
        for (symbol, (bits, len)) in codes.into_iter().enumerate() {
            if len > Code::MAX_LEN {
                return Err(DictionaryError::CodeTooLong { symbol, bits: len });
            }
            table[symbol] = Code::new(bits, len);
        }
        Ok(Self { codes: table })
    }

    /// Returns the code assigned to `symbol`.
    #[must_use]
    #[inline]
    pub const fn code(&self, symbol: u8) -> Code {
        self.codes[symbol as usize]
    }
}
