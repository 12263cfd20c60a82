#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `ferry_compress` implements the dictionary-based bit-level compression
//! used by the ferry file-transfer protocol. A static 256-symbol code
//! dictionary is loaded once at daemon startup; encoding replaces each
//! payload byte with its code bits and decoding walks a binary trie built
//! from the same dictionary.
//!
//! # Design
//!
//! The crate is split into the immutable [`Dictionary`] (symbol to code
//! mapping, loaded from a packed bit-stream resource), the [`DecodeTrie`]
//! (an index-based owned-node arena, built iteratively so adversarial
//! dictionaries cannot exhaust the stack), and the [`compress`] /
//! [`decompress`] entry points operating on plain byte slices. Both
//! structures are read-only after construction and are shared across all
//! daemon connections without locking.
//!
//! # Invariants
//!
//! - A compressed payload is the code bit-stream padded to a byte boundary
//!   followed by one trailer byte recording the padding bit count (0..=7).
//! - For any dictionary whose 256 codes are prefix-free,
//!   `decompress(&trie, &compress(&dict, data))` reproduces `data` exactly,
//!   for every input length including empty.
//! - Code bits are emitted and consumed most-significant bit first.
//!
//! # Errors
//!
//! Loading surfaces [`DictionaryError`] (missing resource, truncated bit
//! stream, over-long code). Decoding surfaces [`DecodeError`] when the
//! payload is malformed: a missing trailer, an impossible padding count, a
//! bit path with no dictionary code behind it, or a stream that ends in the
//! middle of a code. Compression itself cannot fail.

mod bits;
mod codec;
mod dict;
mod error;
mod trie;

pub use codec::{compress, decompress};
pub use dict::{Code, DICT_SYMBOLS, Dictionary};
pub use error::{DecodeError, DictionaryError};
pub use trie::{DecodeTrie, TrieCursor};
