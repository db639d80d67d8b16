//! Runtime configuration, resolved once at startup and passed down
//! explicitly to the server and the generation client.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::consts::{
    DEFAULT_API_BASE, DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT, default_timeout, endpoint_url,
};

/// An inference API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key. Empty or whitespace-only keys count as absent.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Settings for the outbound text-generation call.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_base: String,
    pub model: String,
    pub credential: Option<Credential>,
    pub timeout: Duration,
}

impl GenerationConfig {
    pub fn endpoint(&self) -> String {
        endpoint_url(&self.api_base, &self.model)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            credential: None,
            timeout: default_timeout(),
        }
    }
}

/// Everything the process needs to serve requests.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
    pub generation: GenerationConfig,
}

impl ServerConfig {
    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("invalid bind host {:?}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            debug: false,
            generation: GenerationConfig::default(),
        }
    }
}
