use std::fmt;

/// Classification of a failed generation call.
///
/// The provider's typed error hierarchy is not stable, so failures are
/// classified from the text of the generic failure instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind
{   /// Prompt or output was blocked by a safety policy
    ContentBlocked
  , /// Provider halted generation before completion
    GenerationStopped
  , /// Anything else
    ProviderError
}

/// Map a raw provider failure message to an [`ErrorKind`].
///
/// Case-insensitive substring match. "blocked" wins over "stopped"
/// when a message carries both.
pub fn classify(raw_message: &str) -> ErrorKind
{   let lowered = raw_message.to_lowercase();
    if lowered.contains("blocked")
    {   ErrorKind::ContentBlocked
    } else if lowered.contains("stopped")
    {   ErrorKind::GenerationStopped
    } else
    {   ErrorKind::ProviderError
    }
}

/// True when a raw provider message signals rate limiting.
pub fn is_rate_limited(raw_message: &str) -> bool
{   raw_message.contains("429")
      || raw_message.to_lowercase().contains("resourceexhausted")
}

/// Custom error type for `how` operations
/// Implements Clone so results can be sent across tasks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Provider blocked the prompt or the output
    ContentBlocked(String)
  , /// Provider stopped generating early
    GenerationStopped(String)
  , /// Any other provider failure, original message retained
    ProviderError(String)
  , /// No API key could be found
    MissingApiKey(String)
  , /// API key could not be obtained interactively
    Auth(String)
  , /// Provider returned no text
    EmptyResponse
  , /// Rate limit exceeded after retries
    RateLimitExceeded
  , /// Request timed out after retries
    Timeout
  , /// Local filesystem failure
    Io(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Build the classified error for a raw provider failure message.
    pub fn from_provider_message(raw_message: impl Into<String>) -> Self
    {   let raw_message = raw_message.into();
        match classify(&raw_message)
        {   ErrorKind::ContentBlocked => Error::ContentBlocked(raw_message)
          , ErrorKind::GenerationStopped => {
              Error::GenerationStopped(raw_message)
            }
          , ErrorKind::ProviderError => Error::ProviderError(raw_message)
        }
    }

    /// Classification of this error, if it came from the provider.
    pub fn kind(&self) -> Option<ErrorKind>
    {   match self
        {   Error::ContentBlocked(_) => Some(ErrorKind::ContentBlocked)
          , Error::GenerationStopped(_) => {
              Some(ErrorKind::GenerationStopped)
            }
          , Error::ProviderError(_) => Some(ErrorKind::ProviderError)
          , _ => None
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::ContentBlocked(msg)
          | Error::GenerationStopped(msg)
          | Error::ProviderError(msg) => {
              write!(f, "{}", msg)
            }
          , Error::MissingApiKey(msg) => {
              write!(f, "Missing API key: {}", msg)
            }
          , Error::Auth(msg) => {
              write!(f, "Authentication error: {}", msg)
            }
          , Error::EmptyResponse => {
              write!(f, "Empty response from API")
            }
          , Error::RateLimitExceeded => {
              write!(f, "Rate limit exceeded")
            }
          , Error::Timeout => {
              write!(f, "API request timed out")
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
