//! Pluggable AI chat backend abstraction
//!
//! The chat assistant sends one fully composed prompt per request and gets
//! plain text back, so backends only need a single `generate` operation.
//!
//! # Architecture
//!
//! - `ChatBackend` trait: defines the interface for all chat backends
//! - `ChatClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//! - `FinancialAssistant`: composes system prompt, financial context and task
//!
//! # Usage
//!
//! ```rust,ignore
//! let client = ChatClient::from_env()?;
//! let assistant = FinancialAssistant::new(client, PromptLibrary::new());
//! let answer = assistant.ask("Can I afford a new phone?", &context).await?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: API key (required for gemini backend)
//! - `GEMINI_MODEL`: Model name (default: gemini-2.5-flash)
//! - `GEMINI_API_URL`: Base URL override (default: Google's v1beta endpoint)

pub mod assistant;
mod gemini;
mod mock;

pub use assistant::FinancialAssistant;
pub use gemini::{GeminiBackend, DEFAULT_GEMINI_API_URL, DEFAULT_GEMINI_MODEL};
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all chat backends
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a prompt and return the model's text reply
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Short backend name (for logging and display)
    fn name(&self) -> &'static str;
}

/// Concrete chat client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ChatClient {
    /// Google Gemini generateContent API
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ChatClient {
    /// Create a chat client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `gemini` (default): requires `GEMINI_API_KEY`
    /// - `mock`: canned replies, no network
    pub fn from_env() -> Result<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(ChatClient::Gemini),
            "mock" => Ok(ChatClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(ChatClient::Gemini)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ChatClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            ChatClient::Gemini(b) => b.generate(prompt).await,
            ChatClient::Mock(b) => b.generate(prompt).await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ChatClient::Gemini(b) => b.model(),
            ChatClient::Mock(b) => b.model(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ChatClient::Gemini(b) => b.name(),
            ChatClient::Mock(b) => b.name(),
        }
    }
}
