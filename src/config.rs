//! Configuration for redwire
//!
//! Endpoint parsing and client tuning knobs with sensible defaults.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RedisError, Result};

/// Default Redis port, used when a specifier leaves the port empty
pub const DEFAULT_PORT: u16 = 6379;

// =============================================================================
// Endpoint
// =============================================================================

/// A parsed `host:port` server address
///
/// Parsing either succeeds completely or fails with
/// [`RedisError::Config`]; a half-valid endpoint never exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Parse a `host:port` specifier
    ///
    /// The last `':'` separates host from port, so IPv6 hosts work without
    /// brackets. The separator is mandatory; an empty port after it selects
    /// the default port 6379. Ports must be within `1..=65535`.
    pub fn parse(spec: &str) -> Result<Self> {
        let (host, port) = spec.rsplit_once(':').ok_or_else(|| {
            RedisError::Config(format!("invalid endpoint [{spec}]: missing ':' separator"))
        })?;

        if host.is_empty() {
            return Err(RedisError::Config(format!(
                "invalid endpoint [{spec}]: empty host"
            )));
        }

        let port = if port.is_empty() {
            DEFAULT_PORT
        } else {
            match port.parse::<u16>() {
                Ok(p) if p > 0 => p,
                _ => {
                    return Err(RedisError::Config(format!(
                        "invalid endpoint [{spec}]: bad port [{port}]"
                    )))
                }
            }
        };

        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Host part of the address
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port part of the address
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for Endpoint {
    type Err = RedisError;

    fn from_str(spec: &str) -> Result<Self> {
        Self::parse(spec)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Config
// =============================================================================

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bound on how long one connect attempt may block
    pub connect_timeout: Duration,

    /// Read timeout applied to the TCP handle (`None` defers to the OS)
    pub read_timeout: Option<Duration>,

    /// Write timeout applied to the TCP handle (`None` defers to the OS)
    pub write_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(2),
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the connect timeout
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the read timeout on the TCP handle
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = Some(timeout);
        self
    }

    /// Set the write timeout on the TCP handle
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.config.write_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
