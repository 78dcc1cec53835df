//! Configuration for the relay server and the chat client.
//!
//! Both configs are read from `CAMPUS_*` environment variables. Reading goes
//! through a lookup closure so callers (and tests) can supply any source.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Default relay port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default downstream Rasa REST webhook.
pub const DEFAULT_WEBHOOK_URL: &str = "http://localhost:5005/webhooks/rest/webhook";

/// Default relay endpoint used by the chat client.
pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:3000/api/rasa";

/// Default greeting shown when a conversation starts.
pub const DEFAULT_GREETING: &str = "Hello, Welcome to UTM. How may i assist you today?";

const ENV_RELAY_ADDR: &str = "CAMPUS_RELAY_ADDR";
const ENV_RELAY_PORT: &str = "CAMPUS_RELAY_PORT";
const ENV_WEBHOOK_URL: &str = "CAMPUS_RASA_WEBHOOK_URL";
const ENV_TIMEOUT: &str = "CAMPUS_RELAY_TIMEOUT_SECS";
const ENV_CONNECT_TIMEOUT: &str = "CAMPUS_RELAY_CONNECT_TIMEOUT_SECS";
const ENV_CHAT_RELAY_URL: &str = "CAMPUS_CHAT_RELAY_URL";
const ENV_CHAT_IDENTITY_FILE: &str = "CAMPUS_CHAT_IDENTITY_FILE";
const ENV_CHAT_GREETING: &str = "CAMPUS_CHAT_GREETING";

/// Errors raised while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL setting could not be parsed.
    #[error("invalid url in {key}: {source}")]
    InvalidUrl {
        /// Variable holding the bad value.
        key: &'static str,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// The port is not a valid `u16`.
    #[error("invalid port: {0}")]
    InvalidPort(String),
    /// The bind address is not an IP address.
    #[error("invalid bind address: {0}")]
    InvalidAddress(String),
    /// A timeout is not a whole number of seconds.
    #[error("invalid timeout in {key}: {value}")]
    InvalidTimeout {
        /// Variable holding the bad value.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

/// Relay server configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Address the relay binds to.
    pub bind_addr: IpAddr,
    /// Port the relay listens on.
    pub port: u16,
    /// Downstream webhook every message is forwarded to.
    pub webhook_url: Url,
    /// Whole-request timeout for the downstream call; `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Connect timeout for the downstream call; `None` uses the OS default.
    pub connect_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            webhook_url: default_webhook_url(),
            request_timeout: None,
            connect_timeout: None,
        }
    }
}

impl RelayConfig {
    /// Create a config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the config from the process environment.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the config through `lookup`, falling back to defaults for unset keys.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparsable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup(ENV_RELAY_ADDR) {
            config.bind_addr = addr
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(addr))?;
        }
        if let Some(port) = lookup(ENV_RELAY_PORT) {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(url) = lookup(ENV_WEBHOOK_URL) {
            config.webhook_url = parse_url(ENV_WEBHOOK_URL, &url)?;
        }
        config.request_timeout = parse_timeout(ENV_TIMEOUT, lookup(ENV_TIMEOUT))?;
        config.connect_timeout = parse_timeout(ENV_CONNECT_TIMEOUT, lookup(ENV_CONNECT_TIMEOUT))?;

        Ok(config)
    }

    /// Set the listening port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the downstream webhook.
    #[must_use]
    pub fn with_webhook_url(mut self, url: Url) -> Self {
        self.webhook_url = url;
        self
    }

    /// Set the downstream request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Socket address the server should bind.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

/// Chat client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Relay endpoint the client posts to.
    pub relay_url: Url,
    /// File holding the persisted sender identity.
    pub identity_file: PathBuf,
    /// Greeting appended when a conversation starts.
    pub greeting: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            identity_file: default_identity_file(std::env::var("HOME").ok()),
            greeting: Some(DEFAULT_GREETING.to_string()),
        }
    }
}

impl ChatConfig {
    /// Read the config from the process environment.
    ///
    /// # Errors
    /// Returns an error if the relay URL is unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the config through `lookup`, falling back to defaults for unset keys.
    ///
    /// An empty `CAMPUS_CHAT_GREETING` disables the greeting.
    ///
    /// # Errors
    /// Returns an error if the relay URL is unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let relay_url = match lookup(ENV_CHAT_RELAY_URL) {
            Some(url) => parse_url(ENV_CHAT_RELAY_URL, &url)?,
            None => default_relay_url(),
        };
        let identity_file = lookup(ENV_CHAT_IDENTITY_FILE)
            .map_or_else(|| default_identity_file(lookup("HOME")), PathBuf::from);
        let greeting = match lookup(ENV_CHAT_GREETING) {
            Some(text) if text.trim().is_empty() => None,
            Some(text) => Some(text),
            None => Some(DEFAULT_GREETING.to_string()),
        };

        Ok(Self {
            relay_url,
            identity_file,
            greeting,
        })
    }
}

fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl { key, source })
}

fn parse_timeout(key: &'static str, raw: Option<String>) -> Result<Option<Duration>, ConfigError> {
    raw.map(|value| {
        value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidTimeout { key, value })
    })
    .transpose()
}

fn default_webhook_url() -> Url {
    // Compile-time constant, always parses.
    Url::parse(DEFAULT_WEBHOOK_URL).unwrap_or_else(|_| unreachable!("default webhook url"))
}

fn default_relay_url() -> Url {
    Url::parse(DEFAULT_RELAY_URL).unwrap_or_else(|_| unreachable!("default relay url"))
}

fn default_identity_file(home: Option<String>) -> PathBuf {
    let base = home.map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(".campus-assistant").join("identity.json")
}
