//! Daemon configuration.
//!
//! This module holds the immutable configuration handed to [`run`] and a
//! builder callers use to assemble it. Keeping the type isolated from the
//! runtime keeps the connection loop focused on protocol handling.
//!
//! [`run`]: crate::run

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

/// Port the daemon listens on when none is configured.
pub const DEFAULT_PORT: u16 = 7878;

/// Dictionary resource consulted when no path is configured.
pub const DEFAULT_DICTIONARY: &str = "compression.dict";

/// Immutable configuration describing one daemon instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DaemonConfig {
    bind: IpAddr,
    port: u16,
    root: PathBuf,
    dictionary: PathBuf,
}

impl DaemonConfig {
    /// Creates a new [`DaemonConfigBuilder`].
    #[must_use]
    pub fn builder() -> DaemonConfigBuilder {
        DaemonConfigBuilder::default()
    }

    /// Returns the full socket address to listen on.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Returns the directory whose regular files are served.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the path of the compression dictionary resource.
    #[must_use]
    pub fn dictionary(&self) -> &Path {
        &self.dictionary
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        DaemonConfigBuilder::default().build()
    }
}

/// Builder used to assemble a [`DaemonConfig`].
#[derive(Clone, Debug)]
pub struct DaemonConfigBuilder {
    bind: IpAddr,
    port: u16,
    root: PathBuf,
    dictionary: PathBuf,
}

impl Default for DaemonConfigBuilder {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            root: PathBuf::from("."),
            dictionary: PathBuf::from(DEFAULT_DICTIONARY),
        }
    }
}

impl DaemonConfigBuilder {
    /// Selects the address to bind.
    #[must_use]
    pub fn bind(mut self, bind: IpAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Selects the listening port.
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Selects the served root directory.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Selects the dictionary resource path.
    #[must_use]
    pub fn dictionary(mut self, dictionary: impl Into<PathBuf>) -> Self {
        self.dictionary = dictionary.into();
        self
    }

    /// Finalises the builder.
    #[must_use]
    pub fn build(self) -> DaemonConfig {
        DaemonConfig {
            bind: self.bind,
            port: self.port,
            root: self.root,
            dictionary: self.dictionary,
        }
    }
}
