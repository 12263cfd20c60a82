//! Most-significant-bit-first readers and writers shared by the dictionary
//! loader and the payload codec.

/// Reads individual bits from a byte slice, most-significant bit first.
#[derive(Debug)]
pub(crate) struct BitReader<'a> {
    data: &'a [u8],
    /// Absolute bit position of the next bit to read.
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the next bit, or `None` once the slice is exhausted.
    pub(crate) fn next_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get(self.pos / 8)?;
        let bit = byte >> (7 - self.pos % 8) & 1 == 1;
        self.pos += 1;
        Some(bit)
    }

    /// Reads `count` bits into the low end of a `u32`, first bit highest.
    ///
    /// Returns `None` if the slice runs out before `count` bits were read.
    pub(crate) fn read_bits(&mut self, count: u8) -> Option<u32> {
        debug_assert!(count <= 32);
        let mut value = 0u32;
        for _ in 0..count {
            value = value << 1 | u32::from(self.next_bit()?);
        }
        Some(value)
    }
}

/// Accumulates bits into a byte buffer, most-significant bit first.
///
/// The backing `Vec` supplies the geometric growth required for unbounded
/// inputs; unfilled trailing bits of the final byte stay zero.
#[derive(Debug, Default)]
pub(crate) struct BitWriter {
    out: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub(crate) fn with_capacity(bytes: usize) -> Self {
        Self {
            out: Vec::with_capacity(bytes),
            bit_len: 0,
        }
    }

    /// Appends the low `len` bits of `bits`, most-significant first.
    pub(crate) fn push_code(&mut self, bits: u32, len: u8) {
        debug_assert!(len <= 32);
        for shift in (0..len).rev() {
            let bit = bits >> shift & 1 == 1;
            if self.bit_len % 8 == 0 {
                self.out.push(0);
            }
            if bit {
                let last = self.out.len() - 1;
                self.out[last] |= 0x80 >> (self.bit_len % 8);
            }
            self.bit_len += 1;
        }
    }

    /// Number of bits written so far.
    pub(crate) fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Consumes the writer, returning the byte-aligned buffer.
    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_walks_msb_first() {
        let mut reader = BitReader::new(&[0b1010_0000]);
        assert_eq!(reader.next_bit(), Some(true));
        assert_eq!(reader.next_bit(), Some(false));
        assert_eq!(reader.next_bit(), Some(true));
    }

    #[test]
    fn reader_reports_exhaustion() {
        let mut reader = BitReader::new(&[0xFF]);
        assert_eq!(reader.read_bits(8), Some(0xFF));
        assert_eq!(reader.next_bit(), None);
        assert_eq!(reader.read_bits(1), None);
    }

    #[test]
    fn read_bits_packs_first_bit_highest() {
        let mut reader = BitReader::new(&[0b1100_1010]);
        assert_eq!(reader.read_bits(5), Some(0b11001));
    }

    #[test]
    fn writer_packs_codes_across_byte_boundaries() {
        let mut writer = BitWriter::default();
        writer.push_code(0b101, 3);
        writer.push_code(0b111111, 6);

        assert_eq!(writer.bit_len(), 9);
        assert_eq!(writer.into_bytes(), vec![0b1011_1111, 0b1000_0000]);
    }

    #[test]
    fn writer_roundtrips_with_reader() {
        let mut writer = BitWriter::default();
        writer.push_code(0x2A, 7);
        writer.push_code(0x3, 2);
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        assert_eq!(reader.read_bits(7), Some(0x2A));
        assert_eq!(reader.read_bits(2), Some(0x3));
    }
}
