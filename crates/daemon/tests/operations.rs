//! End-to-end handler tests: one decoded request in, one frame out,
//! exercised against real files in a temporary served root.

use std::fs;
use std::path::Path;

use ferry_compress::{DecodeTrie, Dictionary, compress, decompress};
use ferry_daemon::{Context, Outcome, handle_frame};
use ferry_protocol::{Frame, FrameHeader, HEADER_LEN, RequestCode};

/// All codes eight bits wide: prefix-free over the full byte range.
fn identity_dict() -> Dictionary {
    Dictionary::from_codes(core::array::from_fn(|symbol| (symbol as u32, 8))).unwrap()
}

fn context(root: &Path) -> Context {
    Context::new(identity_dict(), root)
}

/// Runs a request through the handler and returns the raw response bytes.
fn roundtrip(ctx: &Context, frame: &Frame) -> Vec<u8> {
    let bytes = frame.to_bytes();
    let header = FrameHeader::decode(&bytes[..HEADER_LEN]).unwrap();
    match handle_frame(ctx, header, bytes[HEADER_LEN..].to_vec()) {
        Outcome::Respond(response) => response.to_bytes(),
        Outcome::Close => panic!("request unexpectedly closed the connection"),
    }
}

fn payload_of(response: &[u8]) -> &[u8] {
    let mut len = [0u8; 8];
    len.copy_from_slice(&response[1..HEADER_LEN]);
    let declared = u64::from_be_bytes(len) as usize;
    assert_eq!(declared, response.len() - HEADER_LEN, "length field drifted");
    &response[HEADER_LEN..]
}

fn retrieve_payload(id: u32, offset: u64, len: u64, name: &str) -> Vec<u8> {
    let mut payload = Vec::new();
    payload.extend_from_slice(&id.to_be_bytes());
    payload.extend_from_slice(&offset.to_be_bytes());
    payload.extend_from_slice(&len.to_be_bytes());
    payload.extend_from_slice(name.as_bytes());
    payload
}

#[test]
fn echo_returns_an_identical_payload() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());

    let request = Frame::request(RequestCode::Echo, b"hello ferry".to_vec());
    let response = roundtrip(&ctx, &request);

    assert_eq!(response[0], 0x10);
    assert_eq!(payload_of(&response), b"hello ferry");
}

#[test]
fn echo_compresses_on_request() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let trie = DecodeTrie::build(&identity_dict());

    let request =
        Frame::request(RequestCode::Echo, b"compress me".to_vec()).with_request_compress(true);
    let response = roundtrip(&ctx, &request);

    // Response bit: 0x10; compressed bit: 0x08; request_compress cleared.
    assert_eq!(response[0], 0x18);
    assert_eq!(
        decompress(&trie, payload_of(&response)).unwrap(),
        b"compress me"
    );
}

#[test]
fn listing_names_every_regular_file_nul_terminated() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"x").unwrap();
    fs::write(dir.path().join("b.bin"), b"y").unwrap();
    let ctx = context(dir.path());

    let response = roundtrip(&ctx, &Frame::request(RequestCode::DirectoryListing, Vec::new()));
    assert_eq!(response[0], 0x30);

    let payload = payload_of(&response);
    assert_eq!(payload.len(), "a.txt\0b.bin\0".len());
    let mut names: Vec<&[u8]> = payload.split(|&b| b == 0).filter(|s| !s.is_empty()).collect();
    names.sort();
    assert_eq!(names, [b"a.txt".as_slice(), b"b.bin".as_slice()]);
}

#[test]
fn listing_an_empty_directory_is_a_single_nul() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());

    let response = roundtrip(&ctx, &Frame::request(RequestCode::DirectoryListing, Vec::new()));
    assert_eq!(payload_of(&response), [0x00]);
}

#[test]
fn listing_compresses_on_request() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("only.txt"), b"z").unwrap();
    let ctx = context(dir.path());
    let trie = DecodeTrie::build(&identity_dict());

    let request =
        Frame::request(RequestCode::DirectoryListing, Vec::new()).with_request_compress(true);
    let response = roundtrip(&ctx, &request);

    assert_eq!(response[0], 0x38);
    assert_eq!(
        decompress(&trie, payload_of(&response)).unwrap(),
        b"only.txt\0"
    );
}

#[test]
fn size_query_reports_big_endian_length() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("file.dat"), vec![0u8; 4096]).unwrap();
    let ctx = context(dir.path());

    let request = Frame::request(RequestCode::SizeQuery, b"file.dat".to_vec());
    let response = roundtrip(&ctx, &request);

    assert_eq!(response[0], 0x50);
    assert_eq!(payload_of(&response), 4096u64.to_be_bytes());
}

#[test]
fn size_query_for_a_missing_file_is_the_error_frame() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());

    let request = Frame::request(RequestCode::SizeQuery, b"ghost.dat".to_vec());
    let response = roundtrip(&ctx, &request);

    assert_eq!(response, vec![0xF0, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn retrieve_echoes_the_session_header_and_range() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("seq.bin"), (0..=99u8).collect::<Vec<_>>()).unwrap();
    let ctx = context(dir.path());

    let request = Frame::request(
        RequestCode::RetrieveFile,
        retrieve_payload(1, 10, 5, "seq.bin"),
    );
    let response = roundtrip(&ctx, &request);

    assert_eq!(response[0], 0x70);
    let payload = payload_of(&response);
    assert_eq!(&payload[..4], &1u32.to_be_bytes());
    assert_eq!(&payload[4..12], &10u64.to_be_bytes());
    assert_eq!(&payload[12..20], &5u64.to_be_bytes());
    assert_eq!(&payload[20..], [10, 11, 12, 13, 14]);
}

#[test]
fn retrieve_accepts_a_compressed_request() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("seq.bin"), (0..=99u8).collect::<Vec<_>>()).unwrap();
    let dict = identity_dict();
    let ctx = context(dir.path());

    let compressed = compress(&dict, &retrieve_payload(2, 0, 3, "seq.bin"));
    let request =
        Frame::request(RequestCode::RetrieveFile, compressed).with_compressed(true);
    let response = roundtrip(&ctx, &request);

    assert_eq!(response[0], 0x70);
    assert_eq!(&payload_of(&response)[20..], [0, 1, 2]);
}

#[test]
fn duplicate_session_ids_get_the_collision_byte() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("seq.bin"), vec![1u8; 64]).unwrap();
    let ctx = context(dir.path());

    let first = Frame::request(
        RequestCode::RetrieveFile,
        retrieve_payload(7, 0, 8, "seq.bin"),
    );
    roundtrip(&ctx, &first);

    // Same id, different range: the insert must fail, not overwrite.
    let second = Frame::request(
        RequestCode::RetrieveFile,
        retrieve_payload(7, 8, 16, "seq.bin"),
    );
    let response = roundtrip(&ctx, &second);

    assert_eq!(response, vec![0x70, 0, 0, 0, 0, 0, 0, 0, 0]);
    let entry = ctx.sessions().lookup(7).unwrap();
    assert_eq!(entry.start_offset(), 0);
    assert_eq!(entry.data_len(), 8);
}

#[test]
fn retrieve_past_the_end_is_a_short_read_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("short.bin"), vec![0u8; 40]).unwrap();
    let ctx = context(dir.path());

    let request = Frame::request(
        RequestCode::RetrieveFile,
        retrieve_payload(3, 10, 50, "short.bin"),
    );
    let response = roundtrip(&ctx, &request);

    assert_eq!(response, vec![0xF0, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn retrieve_with_a_truncated_session_header_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());

    let request = Frame::request(RequestCode::RetrieveFile, vec![0u8; 19]);
    let response = roundtrip(&ctx, &request);

    assert_eq!(response[0], 0xF0);
}

#[test]
fn unknown_operations_get_the_generic_error_frame() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());

    // Nibble 0x1 is unassigned; the declared length must be ignored.
    let mut raw = [0u8; HEADER_LEN];
    raw[0] = 0x10;
    raw[1..].copy_from_slice(&512u64.to_be_bytes());
    let header = FrameHeader::decode(&raw).unwrap();
    assert_eq!(header.payload_len(), 0);

    match handle_frame(&ctx, header, Vec::new()) {
        Outcome::Respond(frame) => {
            assert_eq!(frame.to_bytes(), vec![0xF0, 0, 0, 0, 0, 0, 0, 0, 0]);
        }
        Outcome::Close => panic!("unknown operations must not close the connection"),
    }
}

#[test]
fn shutdown_closes_without_a_response() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());

    let bytes = Frame::request(RequestCode::Shutdown, Vec::new()).to_bytes();
    let header = FrameHeader::decode(&bytes).unwrap();
    assert_eq!(handle_frame(&ctx, header, Vec::new()), Outcome::Close);
}
