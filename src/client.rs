//! Generation client adapter: one provider call, normalized outcome

use std::time::Duration;

use log::{debug, info, warn};

use crate::config::HowConfig;
use crate::error::{is_rate_limited, Error};
use crate::providers::{GeminiProvider, Provider, ProviderFailure};
use crate::request::{GenerationRequest, GenerationResult};
use crate::retry::RetryPolicy;

/// Outcome of a single attempt before classification
enum Attempt
{   Done(Result<String, ProviderFailure>)
  , TimedOut
}

/// Authenticated handle for issuing generation calls.
///
/// Built once at startup and reused for every request.
pub struct ClientHandle
{   provider: Box<dyn Provider>
  , retry: RetryPolicy
  , default_timeout: Option<Duration>
}

impl ClientHandle
{   pub fn new(provider: impl Provider + 'static) -> Self
    {   ClientHandle
        {   provider: Box::new(provider)
          , retry: RetryPolicy::default()
          , default_timeout: None
        }
    }

    /// Gemini-backed handle configured from `config`.
    pub fn from_config(
      config: &HowConfig
    , api_key: &str
    ) -> Result<Self, Error>
    {   let provider = GeminiProvider::new(api_key, &config.api_base)?;
        Ok(ClientHandle::new(provider)
          .with_retry_policy(RetryPolicy::from(&config.retry))
          .with_default_timeout(config.timeout()))
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self
    {   self.retry = retry;
        self
    }

    /// Timeout applied by [`ClientHandle::generate`].
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self
    {   self.default_timeout = timeout;
        self
    }

    /// Generate text for `prompt` with `model`, using the default timeout.
    pub async fn generate(
      &self
    , model: &str
    , prompt: &str
    ) -> GenerationResult
    {   let request = GenerationRequest::new(model, prompt)
          .with_timeout(self.default_timeout);
        self.send(request).await
    }

    /// Issue `request`.
    ///
    /// Blocked and stopped generations, and any other provider failure,
    /// are returned as classified errors without retrying. Timeouts and
    /// rate limits are retried per the retry policy.
    pub async fn send(&self, request: GenerationRequest) -> GenerationResult
    {   let mut attempt = 0;
        loop
        {   debug!(
              "Generation attempt {} for model: {}"
            , attempt + 1
            , request.model()
            );
            match self.attempt(&request).await
            {   Attempt::Done(Ok(text)) => {
                  if text.trim().is_empty()
                  {   warn!("Provider returned an empty response");
                      return Err(Error::EmptyResponse);
                  }
                  return Ok(text);
                }
              , Attempt::Done(Err(failure)) => {
                  let err = Error::from_provider_message(failure.message);
                  let rate_limited = matches!(
                    &err, Error::ProviderError(msg) if is_rate_limited(msg)
                  );
                  if !rate_limited
                  {   debug!("Provider failure classified as {:?}", err.kind());
                      return Err(err);
                  }
                  if self.retry.is_last_attempt(attempt)
                  {   return Err(Error::RateLimitExceeded);
                  }
                  let wait = self.retry.rate_limit_backoff_for_attempt(attempt);
                  info!("Rate limited, retrying in {:?}", wait);
                  tokio::time::sleep(wait).await;
                }
              , Attempt::TimedOut => {
                  if self.retry.is_last_attempt(attempt)
                  {   return Err(Error::Timeout);
                  }
                  let wait = self.retry.backoff_for_attempt(attempt);
                  info!("Request timed out, retrying in {:?}", wait);
                  tokio::time::sleep(wait).await;
                }
            }
            attempt += 1;
        }
    }

    async fn attempt(&self, request: &GenerationRequest) -> Attempt
    {   let call = self.provider
          .generate_content(request.model(), request.prompt());
        match request.timeout()
        {   Some(limit) => match tokio::time::timeout(limit, call).await
            {   Ok(result) => Attempt::Done(result)
              , Err(_) => Attempt::TimedOut
            }
          , None => Attempt::Done(call.await)
        }
    }
}
