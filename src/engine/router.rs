use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Engine, Reply};
use crate::generator::Generator;
use crate::tools::{Tool, ToolRegistry};

/// Where a query goes.
pub enum Selection {
    Tool(Arc<dyn Tool>),
    Generator,
}

impl Selection {
    pub fn name(&self) -> &str {
        match self {
            Selection::Tool(tool) => tool.name(),
            Selection::Generator => "generator",
        }
    }
}

/// Picks a handler by trigger word: local tools in registry order, the
/// remote generator when nothing matches. Holds no per-request state.
pub struct QueryRouter {
    tools: ToolRegistry,
    generator: Arc<dyn Generator>,
}

impl QueryRouter {
    pub fn new(tools: ToolRegistry, generator: Arc<dyn Generator>) -> Self {
        Self { tools, generator }
    }

    /// Standard tools in front of the given generator.
    pub fn with_generator(generator: Arc<dyn Generator>) -> Self {
        Self::new(ToolRegistry::standard(), generator)
    }

    pub fn select(&self, query: &str) -> Selection {
        match self.tools.find(query) {
            Some(tool) => Selection::Tool(tool),
            None => Selection::Generator,
        }
    }

    pub async fn route(&self, query: &str) -> Reply {
        match self.select(query) {
            Selection::Tool(tool) => {
                info!(tool = tool.name(), "routing to local tool");
                Reply::Text(tool.execute(query))
            }
            Selection::Generator => {
                info!("routing to text generation");
                match self.generator.generate(query).await {
                    Ok(value) => Reply::Json(value),
                    Err(e) => {
                        warn!(error = %e, "text generation failed");
                        Reply::Text(e.to_string())
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Engine for QueryRouter {
    async fn answer(&self, query: &str) -> Reply {
        self.route(query).await
    }
}
