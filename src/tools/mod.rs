pub mod calculator;
pub mod dictionary;

use std::sync::Arc;

use calculator::Calculator;
use dictionary::Dictionary;

/// A local handler picked by a trigger word in the query.
/// Failures are part of the answer text, never an `Err`.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    /// Lower-case substring that selects this tool.
    fn trigger(&self) -> &str;
    fn execute(&self, query: &str) -> String;
}

/// Tools in match order. The first tool whose trigger appears in the
/// lower-cased query wins. Read-only once built.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ToolRegistry {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Calculator first, then dictionary.
    pub fn standard() -> Self {
        let tools: Vec<Arc<dyn Tool>> = vec![
            Arc::new(Calculator),
            Arc::new(Dictionary::builtin()),
        ];
        Self::new(tools)
    }

    /// Find the tool for a query, if any trigger matches.
    pub fn find(&self, query: &str) -> Option<Arc<dyn Tool>> {
        let lowered = query.to_lowercase();
        self.tools
            .iter()
            .find(|t| lowered.contains(t.trigger()))
            .cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}
