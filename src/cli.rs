//! Command-line flags, each with an environment fallback.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Parser, builder::BoolishValueParser};
use tracing::{info, warn};

use crate::config::{Credential, GenerationConfig, ServerConfig};
use crate::consts::{
    API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_HOST, DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS,
};

#[derive(Debug, Parser)]
#[command(
    name = "askd",
    version,
    about = "Answers queries with a calculator, a dictionary, or a hosted text model."
)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "ASKD_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "ASKD_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Text-generation model name
    #[arg(short, long, env = "ASKD_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Inference API base URL (the model name is appended)
    #[arg(long, env = "ASKD_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Outbound request timeout in seconds
    #[arg(short, long, env = "ASKD_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Verbose logging (env accepts 1/0, true/false, yes/no, on/off)
    #[arg(
        short,
        long,
        env = "ASKD_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub debug: bool,

    /// Inference API key
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,
}

impl Cli {
    pub fn into_config(self) -> ServerConfig {
        ServerConfig {
            host: self.host,
            port: self.port,
            debug: self.debug,
            generation: GenerationConfig {
                api_base: self.api_base,
                model: self.model,
                credential: self.api_key.and_then(Credential::new),
                timeout: Duration::from_secs(self.timeout),
            },
        }
    }
}

/// What happened when looking for a `.env` file.
#[derive(Debug)]
pub enum EnvFile {
    Loaded(PathBuf),
    Missing,
    Unreadable(dotenvy::Error),
}

impl EnvFile {
    /// Load `.env` from the working directory or its parents.
    pub fn load() -> Self {
        Self::classify(dotenvy::dotenv())
    }

    pub fn load_from(path: &Path) -> Self {
        Self::classify(dotenvy::from_path(path).map(|()| path.to_path_buf()))
    }

    fn classify(result: Result<PathBuf, dotenvy::Error>) -> Self {
        match result {
            Ok(path) => Self::Loaded(path),
            Err(e) if e.not_found() => Self::Missing,
            Err(e) => Self::Unreadable(e),
        }
    }

    /// Report the outcome once logging is up.
    pub fn log(&self) {
        match self {
            Self::Loaded(path) => info!("loaded environment from {}", path.display()),
            Self::Missing => {}
            Self::Unreadable(e) => warn!(error = %e, "ignoring unreadable .env file"),
        }
    }
}
