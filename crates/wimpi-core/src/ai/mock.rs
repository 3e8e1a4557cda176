//! Mock backend for testing
//!
//! Returns a fixed reply (or a short echo of the prompt) and records every
//! prompt it receives so tests can assert on prompt composition.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

use super::ChatBackend;

/// Mock chat backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    reply: Option<String>,
    /// Error message returned instead of a reply
    failure: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer with `reply`
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::default()
        }
    }

    /// Always fail with `Error::Ai(message)`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        if let Some(message) = &self.failure {
            return Err(Error::Ai(message.clone()));
        }

        Ok(self.reply.clone().unwrap_or_else(|| {
            let first_line = prompt.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
            format!("Mock reply to a {}-character prompt: {}", prompt.len(), first_line)
        }))
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
