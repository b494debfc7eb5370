//! Relay configuration module
//!
//! Provides the configuration consumed by the relay server. Values are usually
//! loaded from the environment by `backend::server::config`, but tests and
//! embedders build them directly through `RelayConfig::builder()`.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

/// Default bind port of the real-time server
pub const DEFAULT_PORT: u16 = 3001;

/// Default keepalive ping period
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Default time a client gets to answer a ping
pub const DEFAULT_PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Relay server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the HTTP server binds to
    pub host: String,
    /// Port the HTTP server binds to
    pub port: u16,
    /// Origin allowed by CORS; `None` allows any origin
    pub frontend_url: Option<String>,
    /// Require a verified bearer token on the socket handshake
    pub require_auth: bool,
    /// HS256 secret used to verify access tokens
    pub jwt_secret: Option<String>,
    /// Keepalive ping period; zero disables pings
    pub ping_interval: Duration,
    /// How long to wait for a pong before closing the socket
    pub pong_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            frontend_url: None,
            require_auth: false,
            jwt_secret: None,
            ping_interval: DEFAULT_PING_INTERVAL,
            pong_timeout: DEFAULT_PONG_TIMEOUT,
        }
    }
}

impl RelayConfig {
    /// Create a new RelayConfigBuilder
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.require_auth && self.jwt_secret.is_none() {
            return Err(ConfigError::MissingValue("ACCESS_JWT_SECRET"));
        }
        if !self.ping_interval.is_zero() && self.pong_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "WS_PONG_TIMEOUT_SECS",
                value: "0".to_string(),
            });
        }
        self.socket_addr().map(|_| ())
    }

    /// Address to bind the listener to
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::InvalidValue {
            key: "SERVER_HOST",
            value: self.host.clone(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Whether socket keepalive pings are enabled
    pub fn keepalive_enabled(&self) -> bool {
        !self.ping_interval.is_zero()
    }
}

/// Builder for RelayConfig
#[derive(Debug, Default)]
pub struct RelayConfigBuilder {
    host: Option<String>,
    port: Option<u16>,
    frontend_url: Option<String>,
    require_auth: bool,
    jwt_secret: Option<String>,
    ping_interval: Option<Duration>,
    pong_timeout: Option<Duration>,
}

impl RelayConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn frontend_url(mut self, url: impl Into<String>) -> Self {
        self.frontend_url = Some(url.into());
        self
    }

    pub fn require_auth(mut self, require: bool) -> Self {
        self.require_auth = require;
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = Some(secret.into());
        self
    }

    pub fn ping_interval(mut self, interval: Duration) -> Self {
        self.ping_interval = Some(interval);
        self
    }

    pub fn pong_timeout(mut self, timeout: Duration) -> Self {
        self.pong_timeout = Some(timeout);
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<RelayConfig, ConfigError> {
        let defaults = RelayConfig::default();
        let config = RelayConfig {
            host: self.host.unwrap_or(defaults.host),
            port: self.port.unwrap_or(defaults.port),
            frontend_url: self.frontend_url,
            require_auth: self.require_auth,
            jwt_secret: self.jwt_secret,
            ping_interval: self.ping_interval.unwrap_or(defaults.ping_interval),
            pong_timeout: self.pong_timeout.unwrap_or(defaults.pong_timeout),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RelayConfig::builder().build().unwrap();
        assert_eq!(config.port, 3001);
        assert!(!config.require_auth);
        assert!(config.keepalive_enabled());
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3001");
    }

    #[test]
    fn test_auth_requires_secret() {
        let result = RelayConfig::builder().require_auth(true).build();
        assert_eq!(result, Err(ConfigError::MissingValue("ACCESS_JWT_SECRET")));

        let config = RelayConfig::builder()
            .require_auth(true)
            .jwt_secret("s3cret")
            .build()
            .unwrap();
        assert_eq!(config.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_invalid_host() {
        let result = RelayConfig::builder().host("not-an-ip").build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { key: "SERVER_HOST", .. })));
    }

    #[test]
    fn test_zero_pong_timeout_with_pings() {
        let result = RelayConfig::builder().pong_timeout(Duration::ZERO).build();
        assert!(result.is_err());

        let config = RelayConfig::builder()
            .ping_interval(Duration::ZERO)
            .pong_timeout(Duration::ZERO)
            .build()
            .unwrap();
        assert!(!config.keepalive_enabled());
    }
}
