//! Operation handlers.
//!
//! [`handle_frame`] is the single entry point the transport driver calls:
//! one decoded request in, one [`Outcome`] out. Every recoverable failure
//! becomes the generic error frame so the connection keeps serving; only
//! shutdown ends the request loop.

use std::path::PathBuf;

use tracing::{debug, warn};

use ferry_compress::{DecodeTrie, Dictionary, compress, decompress};
use ferry_protocol::{Frame, FrameHeader, RequestCode, ResponseCode};
use ferry_session::{SESSION_HEADER_LEN, SessionEntry, SessionError, SessionTable};

use crate::fsops;

/// Shared, injected state every handler call receives.
///
/// The dictionary and trie are immutable after startup and read lock-free;
/// the session table serializes its own access internally.
#[derive(Debug)]
pub struct Context {
    dict: Dictionary,
    trie: DecodeTrie,
    sessions: SessionTable,
    root: PathBuf,
}

impl Context {
    /// Assembles a context around a loaded dictionary and served root.
    #[must_use]
    pub fn new(dict: Dictionary, root: impl Into<PathBuf>) -> Self {
        let trie = DecodeTrie::build(&dict);
        Self {
            dict,
            trie,
            sessions: SessionTable::new(),
            root: root.into(),
        }
    }

    /// Returns the session table, mainly for inspection in tests.
    #[must_use]
    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }
}

/// What the transport driver should do after a request was handled.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    /// Write this frame back to the peer and keep serving.
    Respond(Frame),
    /// Stop the request loop and close the socket without a frame.
    Close,
}

/// Handles one decoded request frame.
pub fn handle_frame(ctx: &Context, header: FrameHeader, payload: Vec<u8>) -> Outcome {
    let Some(code) = header.request() else {
        warn!(nibble = header.nibble(), "unknown operation");
        return Outcome::Respond(Frame::error());
    };
    debug!(operation = %code, payload_len = payload.len(), "handling request");

    match code {
        RequestCode::Echo => Outcome::Respond(echo(ctx, &header, payload)),
        RequestCode::DirectoryListing => Outcome::Respond(directory_listing(ctx, &header)),
        RequestCode::SizeQuery => Outcome::Respond(size_query(ctx, &header, &payload)),
        RequestCode::RetrieveFile => Outcome::Respond(retrieve_file(ctx, &header, payload)),
        RequestCode::Shutdown => Outcome::Close,
    }
}

/// Compresses `payload` when the peer asked for it, marking the frame
/// accordingly. `request_compress` is always cleared on responses.
fn respond(ctx: &Context, code: ResponseCode, payload: Vec<u8>, want_compressed: bool) -> Frame {
    if want_compressed {
        Frame::response(code, compress(&ctx.dict, &payload)).with_compressed(true)
    } else {
        Frame::response(code, payload)
    }
}

fn echo(ctx: &Context, header: &FrameHeader, payload: Vec<u8>) -> Frame {
    if !header.compressed() && header.request_compress() {
        return respond(ctx, ResponseCode::Echo, payload, true);
    }
    // Already-compressed payloads are echoed verbatim, flag intact.
    Frame::response(ResponseCode::Echo, payload).with_compressed(header.compressed())
}

fn directory_listing(ctx: &Context, header: &FrameHeader) -> Frame {
    let names = match fsops::list_regular_files(&ctx.root) {
        Ok(names) => names,
        Err(err) => {
            warn!(root = %ctx.root.display(), %err, "directory enumeration failed");
            return Frame::error();
        }
    };

    if names.is_empty() {
        // An empty directory answers with a single NUL, never compressed.
        return Frame::response(ResponseCode::DirectoryListing, vec![0x00]);
    }

    let mut payload = Vec::new();
    for name in &names {
        payload.extend_from_slice(name.as_bytes());
        payload.push(0x00);
    }
    respond(
        ctx,
        ResponseCode::DirectoryListing,
        payload,
        header.request_compress(),
    )
}

fn size_query(ctx: &Context, header: &FrameHeader, payload: &[u8]) -> Frame {
    let Some(name) = filename_from_payload(payload) else {
        return Frame::error();
    };

    match fsops::stat_size(&ctx.root, name) {
        Ok(size) => respond(
            ctx,
            ResponseCode::SizeQuery,
            size.to_be_bytes().to_vec(),
            header.request_compress(),
        ),
        Err(err) => {
            debug!(name, %err, "size query failed");
            Frame::error()
        }
    }
}

fn retrieve_file(ctx: &Context, header: &FrameHeader, payload: Vec<u8>) -> Frame {
    let payload = if header.compressed() {
        match decompress(&ctx.trie, &payload) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%err, "retrieve payload failed to decompress");
                return Frame::error();
            }
        }
    } else {
        payload
    };

    let entry = match SessionEntry::parse(&payload) {
        Ok(entry) => entry,
        Err(err) => {
            debug!(%err, "malformed retrieve payload");
            return Frame::error();
        }
    };

    // The entry is recorded before the file is touched; a failed read
    // leaves it live, matching the observed protocol behaviour.
    match ctx.sessions.insert(entry.clone()) {
        Ok(()) => {}
        Err(SessionError::Duplicate(id)) => {
            debug!(session_id = id, "duplicate retrieve session");
            return Frame::duplicate_session();
        }
        Err(err) => {
            debug!(%err, "session insert failed");
            return Frame::error();
        }
    }

    let data = match fsops::read_range(
        &ctx.root,
        entry.filename(),
        entry.start_offset(),
        entry.data_len(),
    ) {
        Ok(data) => data,
        Err(err) => {
            debug!(name = entry.filename(), %err, "retrieve read failed");
            return Frame::error();
        }
    };

    let mut response = Vec::with_capacity(SESSION_HEADER_LEN + data.len());
    response.extend_from_slice(&entry.encode_header());
    response.extend_from_slice(&data);
    respond(
        ctx,
        ResponseCode::RetrieveFile,
        response,
        header.request_compress(),
    )
}

/// Interprets a payload as a filename: cut at the first NUL, UTF-8 only.
fn filename_from_payload(payload: &[u8]) -> Option<&str> {
    let bytes = match payload.iter().position(|&byte| byte == 0) {
        Some(nul) => &payload[..nul],
        None => payload,
    };
    core::str::from_utf8(bytes).ok()
}
