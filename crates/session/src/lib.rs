#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `ferry_session` tracks in-flight file retrievals. A retrieve-file
//! request opens with a 20-byte session header (4-byte id, 8-byte start
//! offset, 8-byte data length, all big-endian) followed by a filename;
//! the daemon records each request in a process-wide [`SessionTable`] so
//! a resumed or duplicated exchange can be detected by its id.
//!
//! # Design
//!
//! Entries live in an ordered map keyed by ascending session id behind a
//! single mutex: every insert, lookup and removal across all connections
//! is serialized, because concurrent retrieves from different peers may
//! race on the same id. The table is shared by injection (an `Arc` inside
//! the daemon context), never through ambient global state.
//!
//! # Invariants
//!
//! - A session id is unique among live entries: inserting a duplicate
//!   fails with [`SessionError::Duplicate`] and leaves the first entry
//!   untouched.
//! - Nothing evicts entries automatically; once inserted, an entry lives
//!   until [`SessionTable::remove`] is called or the process exits. The
//!   daemon currently never removes entries, matching the observed
//!   protocol behaviour.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Size of the fixed session header opening a retrieve payload.
pub const SESSION_HEADER_LEN: usize = 20;

/// Longest filename a session entry may carry, in bytes.
pub const MAX_FILENAME_LEN: usize = 199;

/// Failures raised while parsing or storing session entries.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SessionError {
    /// The retrieve payload is shorter than the 20-byte session header.
    #[error("retrieve payload holds {actual} bytes; the session header alone needs {SESSION_HEADER_LEN}")]
    TruncatedPayload {
        /// Bytes actually present.
        actual: usize,
    },
    /// The filename exceeds [`MAX_FILENAME_LEN`] bytes.
    #[error("session filename spans {actual} bytes, exceeding the {MAX_FILENAME_LEN}-byte limit")]
    FilenameTooLong {
        /// Length of the offending name.
        actual: usize,
    },
    /// The filename bytes are not valid UTF-8.
    #[error("session filename is not valid UTF-8")]
    FilenameNotUtf8,
    /// An entry with this session id is already live.
    #[error("session id {0} is already in use")]
    Duplicate(u32),
    /// No live entry carries this session id.
    #[error("no live session has id {0}")]
    NotFound(u32),
}

/// Metadata correlating one multi-step file retrieval.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionEntry {
    session_id: u32,
    filename: String,
    start_offset: u64,
    data_len: u64,
}

impl SessionEntry {
    /// Creates an entry from already-validated fields.
    pub fn new(
        session_id: u32,
        filename: impl Into<String>,
        start_offset: u64,
        data_len: u64,
    ) -> Result<Self, SessionError> {
        let filename = filename.into();
        if filename.len() > MAX_FILENAME_LEN {
            return Err(SessionError::FilenameTooLong {
                actual: filename.len(),
            });
        }
        Ok(Self {
            session_id,
            filename,
            start_offset,
            data_len,
        })
    }

    /// Parses an entry from a decoded retrieve-file payload.
    ///
    /// The filename occupies everything after the fixed header and is cut
    /// at the first NUL byte, mirroring the C-string framing peers send.
    pub fn parse(payload: &[u8]) -> Result<Self, SessionError> {
        if payload.len() < SESSION_HEADER_LEN {
            return Err(SessionError::TruncatedPayload {
                actual: payload.len(),
            });
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&payload[0..4]);
        let session_id = u32::from_be_bytes(id);
        let mut field = [0u8; 8];
        field.copy_from_slice(&payload[4..12]);
        let start_offset = u64::from_be_bytes(field);
        field.copy_from_slice(&payload[12..20]);
        let data_len = u64::from_be_bytes(field);

        let mut name_bytes = &payload[SESSION_HEADER_LEN..];
        if let Some(nul) = name_bytes.iter().position(|&byte| byte == 0) {
            name_bytes = &name_bytes[..nul];
        }
        if name_bytes.len() > MAX_FILENAME_LEN {
            return Err(SessionError::FilenameTooLong {
                actual: name_bytes.len(),
            });
        }
        let filename = core::str::from_utf8(name_bytes)
            .map_err(|_| SessionError::FilenameNotUtf8)?
            .to_owned();

        Ok(Self {
            session_id,
            filename,
            start_offset,
            data_len,
        })
    }

    /// Re-encodes the 20-byte session header for the response frame.
    #[must_use]
    pub fn encode_header(&self) -> [u8; SESSION_HEADER_LEN] {
        let mut out = [0u8; SESSION_HEADER_LEN];
        out[0..4].copy_from_slice(&self.session_id.to_be_bytes());
        out[4..12].copy_from_slice(&self.start_offset.to_be_bytes());
        out[12..20].copy_from_slice(&self.data_len.to_be_bytes());
        out
    }

    /// Returns the session id.
    #[must_use]
    #[inline]
    pub const fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Returns the requested filename.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the byte offset the transfer starts at.
    #[must_use]
    #[inline]
    pub const fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Returns the number of bytes the transfer covers.
    #[must_use]
    #[inline]
    pub const fn data_len(&self) -> u64 {
        self.data_len
    }
}

/// The process-wide table of live retrieve sessions.
///
/// Iteration order over the underlying map is ascending by session id;
/// all access is serialized behind one lock.
#[derive(Debug, Default)]
pub struct SessionTable {
    entries: Mutex<BTreeMap<u32, SessionEntry>>,
}

impl SessionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, failing without modification when its id is
    /// already live.
    pub fn insert(&self, entry: SessionEntry) -> Result<(), SessionError> {
        let mut entries = self.lock();
        match entries.entry(entry.session_id) {
            std::collections::btree_map::Entry::Occupied(_) => {
                Err(SessionError::Duplicate(entry.session_id))
            }
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    /// Returns a copy of the entry with `session_id`, when live.
    #[must_use]
    pub fn lookup(&self, session_id: u32) -> Option<SessionEntry> {
        self.lock().get(&session_id).cloned()
    }

    /// Removes and returns the entry with `session_id`.
    ///
    /// This is the explicit removal hook; the daemon's request handlers
    /// never call it, so entries persist for the process lifetime.
    pub fn remove(&self, session_id: u32) -> Result<SessionEntry, SessionError> {
        self.lock()
            .remove(&session_id)
            .ok_or(SessionError::NotFound(session_id))
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Reports whether the table holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<u32, SessionEntry>> {
        // A poisoned lock only means another connection panicked mid-insert;
        // the map itself is still structurally sound.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn retrieve_payload(id: u32, offset: u64, len: u64, name: &[u8]) -> Vec<u8> {
        let mut payload = Vec::with_capacity(SESSION_HEADER_LEN + name.len());
        payload.extend_from_slice(&id.to_be_bytes());
        payload.extend_from_slice(&offset.to_be_bytes());
        payload.extend_from_slice(&len.to_be_bytes());
        payload.extend_from_slice(name);
        payload
    }

    #[test]
    fn parse_extracts_big_endian_fields_and_name() {
        let payload = retrieve_payload(7, 10, 50, b"report.txt");
        let entry = SessionEntry::parse(&payload).unwrap();

        assert_eq!(entry.session_id(), 7);
        assert_eq!(entry.start_offset(), 10);
        assert_eq!(entry.data_len(), 50);
        assert_eq!(entry.filename(), "report.txt");
    }

    #[test]
    fn parse_cuts_the_name_at_the_first_nul() {
        let payload = retrieve_payload(1, 0, 0, b"data.bin\0trailing garbage");
        let entry = SessionEntry::parse(&payload).unwrap();
        assert_eq!(entry.filename(), "data.bin");
    }

    #[test]
    fn parse_accepts_a_bare_session_header() {
        let payload = retrieve_payload(3, 0, 16, b"");
        let entry = SessionEntry::parse(&payload).unwrap();
        assert_eq!(entry.filename(), "");
    }

    #[test]
    fn parse_rejects_short_payloads() {
        let err = SessionEntry::parse(&[0u8; 19]).unwrap_err();
        assert_eq!(err, SessionError::TruncatedPayload { actual: 19 });
    }

    #[test]
    fn parse_rejects_oversized_names() {
        let name = vec![b'x'; MAX_FILENAME_LEN + 1];
        let err = SessionEntry::parse(&retrieve_payload(1, 0, 0, &name)).unwrap_err();
        assert_eq!(err, SessionError::FilenameTooLong { actual: 200 });
    }

    #[test]
    fn parse_rejects_non_utf8_names() {
        let err = SessionEntry::parse(&retrieve_payload(1, 0, 0, &[0xFF, 0xFE])).unwrap_err();
        assert_eq!(err, SessionError::FilenameNotUtf8);
    }

    #[test]
    fn encode_header_roundtrips_through_parse() {
        let entry = SessionEntry::new(0xDEAD_BEEF, "f", 1 << 40, 1 << 33).unwrap();
        let mut payload = entry.encode_header().to_vec();
        payload.extend_from_slice(b"f");

        assert_eq!(SessionEntry::parse(&payload).unwrap(), entry);
    }

    #[test]
    fn duplicate_insert_fails_and_preserves_the_first_entry() {
        let table = SessionTable::new();
        let first = SessionEntry::new(9, "first.txt", 0, 10).unwrap();
        let second = SessionEntry::new(9, "second.txt", 5, 99).unwrap();

        table.insert(first.clone()).unwrap();
        assert_eq!(
            table.insert(second).unwrap_err(),
            SessionError::Duplicate(9)
        );
        assert_eq!(table.lookup(9), Some(first));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn lookup_misses_return_none() {
        let table = SessionTable::new();
        assert_eq!(table.lookup(42), None);
    }

    #[test]
    fn remove_returns_the_entry_or_fails_when_absent() {
        let table = SessionTable::new();
        let entry = SessionEntry::new(4, "gone.bin", 0, 1).unwrap();
        table.insert(entry.clone()).unwrap();

        assert_eq!(table.remove(4).unwrap(), entry);
        assert!(table.is_empty());
        assert_eq!(table.remove(4).unwrap_err(), SessionError::NotFound(4));
    }

    #[test]
    fn distinct_ids_coexist() {
        let table = SessionTable::new();
        for id in [3u32, 1, 2] {
            table
                .insert(SessionEntry::new(id, format!("{id}.dat"), 0, 0).unwrap())
                .unwrap();
        }
        assert_eq!(table.len(), 3);
        assert_eq!(table.lookup(2).unwrap().filename(), "2.dat");
    }
}
