//! Request and result types for a single generation call

use std::time::Duration;

/// Outcome of one generation call: the provider's text, or a
/// classified failure.
pub type GenerationResult = Result<String, crate::error::Error>;

/// One text-generation call.
///
/// Built per call site and consumed by
/// [`ClientHandle::send`](crate::client::ClientHandle::send).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest
{   /// The prompt text
    prompt: String
  , /// Model identifier, e.g. "models/gemini-3-flash-preview"
    model: String
  , /// Per-attempt timeout, `None` to wait indefinitely
    timeout: Option<Duration>
}

impl GenerationRequest
{   pub fn new(
      model: impl Into<String>
    , prompt: impl Into<String>
    ) -> Self
    {   GenerationRequest
        {   prompt: prompt.into()
          , model: model.into()
          , timeout: None
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self
    {   self.timeout = timeout;
        self
    }

    pub fn prompt(&self) -> &str
    {   &self.prompt
    }

    pub fn model(&self) -> &str
    {   &self.model
    }

    pub fn timeout(&self) -> Option<Duration>
    {   self.timeout
    }
}
