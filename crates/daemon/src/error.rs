use std::io;
use std::net::SocketAddr;

use ferry_compress::DictionaryError;
use thiserror::Error;

/// Fatal failures that abort the daemon as a whole.
///
/// Per-request and per-connection failures never surface here; they are
/// either answered with the generic error frame or end only the affected
/// connection.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// The compression dictionary could not be loaded at startup.
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    /// The listening socket could not be created or bound.
    #[error("failed to listen on {addr}: {source}")]
    Bind {
        /// Address the daemon attempted to bind.
        addr: SocketAddr,
        /// Underlying socket failure.
        source: io::Error,
    },
}
