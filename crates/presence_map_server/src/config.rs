//! Listener configuration of the presence service.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::{Result, ServerError};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory served as static files next to the WebSocket endpoint.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                return Err(ServerError::InvalidConfig(format!(
                    "static_dir '{}' is not a directory",
                    dir.display()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let config = ServerConfig::new();
        assert_eq!(config.addr(), "0.0.0.0:3000".parse().unwrap());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_static_dir_is_rejected() {
        let config = ServerConfig::new()
            .with_port(8080)
            .with_static_dir(Some(PathBuf::from("/definitely/not/a/dir")));
        assert!(matches!(
            config.validate(),
            Err(ServerError::InvalidConfig(_))
        ));
        assert_eq!(config.addr().port(), 8080);
    }

    #[test]
    fn existing_static_dir_is_accepted() {
        let config = ServerConfig::new().with_static_dir(Some(std::env::temp_dir()));
        assert!(config.validate().is_ok());
    }
}
