//! Server configuration

use shared::DEFAULT_PORT;
use std::path::PathBuf;

/// Runtime settings for [`crate::ChatServer`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind to
    pub host: String,
    /// Port to listen on; 0 picks an ephemeral port
    pub port: u16,
    /// Directory served for every path that is not an API route
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from("public"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_bind_address_is_parseable() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 0,
            ..ServerConfig::default()
        };
        assert!(config
            .bind_address()
            .parse::<std::net::SocketAddr>()
            .is_ok());
    }
}
