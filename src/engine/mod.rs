pub mod router;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// What a query produces. Tool answers and every failure are text; a
/// successful generation is the endpoint's JSON, passed through as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Text(String),
    Json(Value),
}

impl Reply {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(s) => Some(s),
            Reply::Json(_) => None,
        }
    }
}

/// The outermost boundary. The HTTP layer only knows this trait.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn answer(&self, query: &str) -> Reply;
}
