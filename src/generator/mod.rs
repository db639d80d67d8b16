pub mod huggingface;
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::consts::API_KEY_ENV;

/// Why a generation request produced no model output. Each variant renders
/// to the text the caller sees.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("API key not found! Please set {env}.", env = API_KEY_ENV)]
    MissingCredential,
    #[error("Error {code}: {body}")]
    Status { code: u16, body: String },
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Invalid response from inference endpoint: {0}")]
    InvalidBody(String),
}

/// Something that turns a prompt into model output. The output is opaque
/// JSON and is handed back to the caller untouched.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Value, GenerationError>;
}
