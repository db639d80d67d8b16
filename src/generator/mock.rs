use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::{GenerationError, Generator};

/// A scripted generator for tests. Returns pre-defined replies in order
/// and remembers every prompt it was given.
pub struct MockGenerator {
    replies: Vec<Result<Value, GenerationError>>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    pub fn new(replies: Vec<Result<Value, GenerationError>>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<Value, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        self.replies.get(i).cloned().unwrap_or_else(|| {
            Err(GenerationError::Transport(format!(
                "MockGenerator: no more replies (called {} times)",
                i + 1
            )))
        })
    }
}
