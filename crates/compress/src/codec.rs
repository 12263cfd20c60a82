use crate::bits::{BitReader, BitWriter};
use crate::dict::Dictionary;
use crate::error::DecodeError;
use crate::trie::DecodeTrie;

/// Compresses `input` into a self-delimiting payload.
///
/// Each input byte is replaced by its dictionary code, most-significant
/// bit first. The bitstream is padded with zero bits to the next byte
/// boundary and followed by one trailer byte holding the padding count,
/// so the emitted payload is `ceil(bits / 8) + 1` bytes. An empty input
/// yields the single trailer byte `[0x00]`.
#[must_use]
pub fn compress(dict: &Dictionary, input: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(input.len() + 1);
    for &byte in input {
        let code = dict.code(byte);
        writer.push_code(code.bits(), code.len());
    }

    let padding = (8 - writer.bit_len() % 8) % 8;
    let mut payload = writer.into_bytes();
    payload.push(padding as u8);
    payload
}

/// Decompresses a payload produced by [`compress`].
///
/// The trailer byte bounds the walk exactly: with `padding` trailing
/// fill bits, `(payload_len - 1) * 8 - padding` bits of the stream are
/// real code bits. The walk descends the trie one bit at a time, emits a
/// symbol and resets to the root at every leaf, and rejects streams that
/// wander off the codebook or stop mid-code.
pub fn decompress(trie: &DecodeTrie, payload: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let (&trailer, bitstream) = payload.split_last().ok_or(DecodeError::MissingTrailer)?;
    if trailer >= 8 {
        return Err(DecodeError::InvalidPadding(trailer));
    }
    let total_bits = (bitstream.len() * 8)
        .checked_sub(trailer as usize)
        .ok_or(DecodeError::InvalidPadding(trailer))?;

    let mut output = Vec::with_capacity(bitstream.len().saturating_mul(2));
    let mut reader = BitReader::new(bitstream);
    let mut cursor = trie.root();
    let mut depth = 0usize;

    for offset in 0..total_bits {
        // total_bits never exceeds the slice, so the reader cannot run dry.
        let Some(bit) = reader.next_bit() else { break };
        cursor = trie
            .step(cursor, bit)
            .ok_or(DecodeError::DeadEnd { bit_offset: offset })?;
        depth += 1;

        if let Some(symbol) = trie.symbol(cursor) {
            output.push(symbol);
            cursor = trie.root();
            depth = 0;
        }
    }

    if depth != 0 {
        return Err(DecodeError::DanglingBits { bits: depth });
    }
    Ok(output)
}
