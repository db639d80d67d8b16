use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{GenerationError, Generator};
use crate::config::{Credential, GenerationConfig};

/// Calls a hosted inference endpoint once per prompt. No retries.
#[derive(Debug)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    endpoint: String,
    credential: Option<Credential>,
    timeout: Duration,
}

impl HuggingFaceClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: config.endpoint(),
            credential: config.credential.clone(),
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    fn transport_error(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout)
        } else {
            GenerationError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Generator for HuggingFaceClient {
    async fn generate(&self, prompt: &str) -> Result<Value, GenerationError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(GenerationError::MissingCredential)?;

        debug!(endpoint = %self.endpoint, "sending generation request");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credential.expose())
            .json(&GenerateRequest { inputs: prompt })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(error = %e, "failed to read error response body");
                    format!("<unreadable body: {}>", e)
                }
            };
            warn!(status = status.as_u16(), "inference endpoint returned an error");
            return Err(GenerationError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&bytes).map_err(|e| GenerationError::InvalidBody(e.to_string()))
    }
}

// --- API types ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
}
