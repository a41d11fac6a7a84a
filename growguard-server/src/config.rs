//! Server configuration

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
};

/// Readings kept in the rolling history
pub const HISTORY_CAPACITY: usize = 100;

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: SocketAddr,
    /// Directory holding the detector artifacts
    pub artifact_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            artifact_dir: PathBuf::from("."),
        }
    }
}

impl ServerConfig {
    /// Set the listen address
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set the artifact directory
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = dir.into();
        self
    }
}
