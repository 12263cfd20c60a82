//! The TCP transport driver: accept loop and per-connection request loop.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;

use socket2::{Domain, Socket, Type};
use tracing::{debug, info, warn};

use ferry_compress::Dictionary;
use ferry_protocol::{FrameHeader, HEADER_LEN};

use crate::config::DaemonConfig;
use crate::error::DaemonError;
use crate::handler::{Context, Outcome, handle_frame};

/// Loads the dictionary, binds the listener and serves forever.
///
/// One OS thread is spawned per accepted connection; there is no cap on
/// simultaneous peers and no timeout on an idle connection.
pub fn run(config: DaemonConfig) -> Result<(), DaemonError> {
    let dict = Dictionary::load(config.dictionary())?;
    let ctx = Arc::new(Context::new(dict, config.root()));

    let addr = config.socket_addr();
    let listener = bind(addr)?;
    info!(%addr, root = %config.root().display(), "ferryd listening");

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%err, "accept failed");
                continue;
            }
        };
        let ctx = Arc::clone(&ctx);
        thread::spawn(move || {
            let peer = stream
                .peer_addr()
                .map_or_else(|_| String::from("unknown"), |addr| addr.to_string());
            debug!(%peer, "connection opened");
            let mut stream = stream;
            match serve_connection(&ctx, &mut stream) {
                Ok(()) => debug!(%peer, "connection closed"),
                Err(err) => warn!(%peer, %err, "connection torn down"),
            }
        });
    }

    Ok(())
}

/// Binds `addr` with `SO_REUSEADDR`, the way the daemon is restarted in
/// place during deploys.
fn bind(addr: SocketAddr) -> Result<TcpListener, DaemonError> {
    let bind_inner = |addr: SocketAddr| -> io::Result<TcpListener> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, None)?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(128)?;
        Ok(socket.into())
    };
    bind_inner(addr).map_err(|source| DaemonError::Bind { addr, source })
}

/// Serves one connection until shutdown, disconnect or a fatal I/O error.
///
/// A clean close between frames ends the loop silently; running out of
/// bytes inside a header or payload is a truncated frame and surfaces as
/// an error so the caller logs the teardown. A header declaring a payload
/// beyond the frame limit tears the connection down before any buffer is
/// sized from it.
fn serve_connection<S: Read + Write>(ctx: &Context, stream: &mut S) -> io::Result<()> {
    loop {
        let mut header_bytes = [0u8; HEADER_LEN];
        match stream.read_exact(&mut header_bytes) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err),
        }

        let header = FrameHeader::decode(&header_bytes).map_err(io::Error::other)?;
        if header.request().is_none() {
            // Decoding forced the length to zero, but the peer still sent
            // the bytes its wire header declared. Drain them so the next
            // header read starts on a frame boundary.
            let mut declared = [0u8; 8];
            declared.copy_from_slice(&header_bytes[1..HEADER_LEN]);
            let declared = u64::from_be_bytes(declared);
            io::copy(&mut io::Read::by_ref(stream).take(declared), &mut io::sink())?;
        }
        let payload_len = header.payload_len_usize().map_err(io::Error::other)?;
        let mut payload = vec![0u8; payload_len];
        stream.read_exact(&mut payload)?;

        match handle_frame(ctx, header, payload) {
            Outcome::Respond(frame) => stream.write_all(&frame.to_bytes())?,
            Outcome::Close => return Ok(()),
        }
    }
}
