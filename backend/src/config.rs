//! Server configuration read from the environment.
//!
//! - `HOST`: bind address (default: 0.0.0.0)
//! - `PORT`: bind port (default: 3000)
//! - `APP_ENV`: `development` or `production` (default: development).
//!   `NODE_ENV` is read when `APP_ENV` is unset.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

/// Deployment environment. Development exposes internal error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("Unknown environment: {}", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            environment: Environment::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// Unset variables take their defaults; set but unparsable ones are errors.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let host = std::env::var("HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.host);

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| format!("Invalid PORT value: {}", raw))?,
            Err(_) => defaults.port,
        };

        let environment = match std::env::var("APP_ENV").or_else(|_| std::env::var("NODE_ENV")) {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.environment,
        };

        Ok(Self {
            host,
            port,
            environment,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}
