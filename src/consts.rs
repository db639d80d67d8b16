//! Project-wide constants.

use std::time::Duration;

/// Base URL of the hosted inference API. The model name is appended.
pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Default text-generation model when none is specified.
pub const DEFAULT_MODEL: &str = "gpt2";

/// Environment variable holding the inference API key.
pub const API_KEY_ENV: &str = "HUGGING_FACE_API_KEY";

/// Outbound request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

/// Longest expression the calculator will look at.
pub const MAX_EXPRESSION_LEN: usize = 1000;

/// Largest integer the calculator will produce, in bits.
pub const MAX_INT_BITS: u64 = 16_384;

/// Join an API base and a model name into a full endpoint URL.
pub fn endpoint_url(api_base: &str, model: &str) -> String {
    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        model.trim_start_matches('/')
    )
}

pub fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_TIMEOUT_SECS)
}
