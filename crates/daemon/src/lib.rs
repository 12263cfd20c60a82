#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `ferry_daemon` is the serving side of the ferry file-transfer protocol:
//! it accepts TCP connections, reads one frame per request, dispatches to
//! the operation handlers (echo, directory listing, size query, retrieve
//! file, shutdown) and writes exactly one response frame back — except for
//! shutdown and fatal read failures, which close the connection silently.
//!
//! # Design
//!
//! The immutable compression [`Dictionary`](ferry_compress::Dictionary)
//! and [`DecodeTrie`](ferry_compress::DecodeTrie) plus the lock-guarded
//! [`SessionTable`](ferry_session::SessionTable) live in a [`Context`]
//! that is reference-counted into every connection thread; no handler
//! touches ambient global state. The accept loop spawns one OS thread per
//! connection with no upper bound on simultaneous peers, and each thread
//! blocks only on its own socket and file I/O.
//!
//! # Errors
//!
//! Handler-level failures (unknown operation, malformed session header,
//! missing file, short read, corrupt bitstream) are converted into the
//! generic error frame and the connection keeps serving. Truncated frames
//! and socket errors tear the connection down without a response. A
//! dictionary that fails to load aborts daemon startup entirely.

pub mod cli;
pub mod config;
mod error;
pub mod fsops;
mod handler;
mod server;

pub use config::DaemonConfig;
pub use error::DaemonError;
pub use handler::{Context, Outcome, handle_frame};
pub use server::run;
