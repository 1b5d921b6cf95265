//! # LLM providers
//!
//! Chat completion backends behind the [`ChatProvider`] trait and the
//! [`ModelRouter`] that tries them in order.
//!
//! - `GeminiProvider`: primary, Google Generative Language API
//! - `OpenAiCompatibleProvider`: fallback, any `/chat/completions` endpoint
//! - `RetryPolicy`: exponential backoff applied to each provider before
//!   moving on to the next one

pub mod error;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod provider;
pub mod retry;
pub mod router;

pub use error::{ProviderError, ProviderErrorKind};
pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatibleProvider;
pub use provider::{ChatMessage, ChatProvider, ProviderRequest, Role};
pub use retry::RetryPolicy;
pub use router::{ModelRouter, RoutedReply};
