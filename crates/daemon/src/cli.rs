//! Command-line interface for the `ferryd` binary.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_DICTIONARY, DEFAULT_PORT, DaemonConfig};

/// Serve files over the ferry fixed-header transfer protocol.
#[derive(Clone, Debug, Parser)]
#[command(name = "ferryd", version, about)]
pub struct Cli {
    /// Address to bind the listener to.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory whose regular files are served.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Compression dictionary resource.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_DICTIONARY)]
    pub dictionary: PathBuf,
}

impl Cli {
    /// Converts the parsed arguments into a [`DaemonConfig`].
    #[must_use]
    pub fn into_config(self) -> DaemonConfig {
        DaemonConfig::builder()
            .bind(self.bind)
            .port(self.port)
            .root(self.root)
            .dictionary(self.dictionary)
            .build()
    }
}
