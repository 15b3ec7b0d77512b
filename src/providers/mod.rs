//! Generative-AI provider implementations

use std::fmt;
use std::future::Future;
use std::pin::Pin;

pub mod gemini;

// Re-export for convenience
pub use gemini::GeminiProvider;

/// Boxed future returned by [`Provider::generate_content`], boxed to keep
/// the trait dyn-compatible.
pub type ProviderFuture<'a> = Pin<
  Box<dyn Future<Output = Result<String, ProviderFailure>> + Send + 'a>
>;

/// A generic provider failure. Only the message is reliable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure
{   pub message: String
}

impl ProviderFailure
{   pub fn new(message: impl Into<String>) -> Self
    {   ProviderFailure
        {   message: message.into()
        }
    }
}

impl fmt::Display for ProviderFailure
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   write!(f, "{}", self.message)
    }
}

impl std::error::Error for ProviderFailure {}

/// A text-generation backend.
pub trait Provider: Send + Sync
{   /// Generate content for `contents` with `model`.
    ///
    /// # Errors
    ///
    /// Returns the provider's generic failure (network, HTTP status,
    /// safety block, early stop).
    fn generate_content<'a>(
      &'a self
    , model: &'a str
    , contents: &'a str
    ) -> ProviderFuture<'a>;
}
