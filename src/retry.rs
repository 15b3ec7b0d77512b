//! Retry policy for timed-out and rate-limited requests

use std::time::Duration;
use log::debug;

use crate::config::RetryConfig;

/// Retry policy for failed requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy
{   pub max_retries: usize
  , pub backoff_multiplier: f32
  , pub initial_backoff: Duration
}

impl RetryPolicy
{   /// Create a new retry policy
    pub fn new(
      max_retries: usize
    , backoff_multiplier: f32
    , initial_backoff_ms: u64
    ) -> Self
    {   RetryPolicy
        {   max_retries
          , backoff_multiplier
          , initial_backoff: Duration::from_millis(
              initial_backoff_ms
            )
        }
    }

    /// A policy that makes exactly one attempt
    pub fn no_retries() -> Self
    {   RetryPolicy::new(1, 1.0, 0)
    }

    /// Calculate backoff duration for attempt number
    pub fn backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   debug!("Calculating backoff for attempt {}", attempt);
        let multiplier
          = self.backoff_multiplier.powi(attempt as i32);
        Duration::from_millis(
          (self.initial_backoff.as_millis() as f32
            * multiplier) as u64
        )
    }

    /// Backoff after a rate-limited attempt: one second more than a
    /// plain backoff, scaled with the initial backoff.
    pub fn rate_limit_backoff_for_attempt(
      &self
    , attempt: usize
    ) -> Duration
    {   self.backoff_for_attempt(attempt) + self.initial_backoff
    }

    /// Whether `attempt` (zero-based) is the final one
    pub fn is_last_attempt(&self, attempt: usize) -> bool
    {   attempt + 1 >= self.max_retries.max(1)
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(3, 2.0, 1000)
    }
}

impl From<&RetryConfig> for RetryPolicy
{   fn from(config: &RetryConfig) -> Self
    {   RetryPolicy::new(
          config.max_retries
        , config.backoff_multiplier
        , config.initial_backoff_ms
        )
    }
}
