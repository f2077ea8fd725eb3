use crate::fetcher::traits::Transport;
use crate::model::FetchError;
use crate::utils::{backoff_delay, parse_retry_after};

use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

const TOO_MANY_REQUESTS: u16 = 429;

/// Attempt budget and base delay for [`ResilientFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Result<Self, FetchError> {
        if max_retries == 0 {
            return Err(FetchError::InvalidPolicy("max_retries must be at least 1"));
        }
        if initial_backoff.is_zero() {
            return Err(FetchError::InvalidPolicy("initial backoff must be positive"));
        }
        Ok(Self { max_retries, initial_backoff })
    }

    pub fn from_millis(max_retries: u32, initial_backoff_ms: u64) -> Result<Self, FetchError> {
        Self::new(max_retries, Duration::from_millis(initial_backoff_ms))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff
    }

    /// Delay after the failed attempt with index `attempt` (0-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        backoff_delay(self.initial_backoff, attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(1000),
        }
    }
}

/// Outcome of one GET, inspected by the retry loop.
enum Attempt {
    Done(Value),
    RateLimited(Duration),
    Failed(FetchError),
}

/// GET-and-parse-JSON with deterministic exponential backoff.
///
/// Rate-limited (429) responses and network failures are retried until the
/// attempt budget runs out. Any other non-success status, and bodies that are
/// not JSON, fail on the spot. The fetcher holds no per-call state, so one
/// instance can serve overlapping calls.
pub struct ResilientFetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> ResilientFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    #[cfg(test)]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.fetch_with(url, self.policy).await
    }

    pub async fn fetch_with(&self, url: &str, policy: RetryPolicy) -> Result<Value, FetchError> {
        let attempts = policy.max_retries();

        for attempt in 0..attempts {
            let last = attempt + 1 == attempts;

            let delay = match self.attempt(url, attempt, &policy).await {
                Attempt::Done(body) => return Ok(body),
                Attempt::RateLimited(_) if last => {
                    return Err(FetchError::Http {
                        status: TOO_MANY_REQUESTS,
                        status_text: "Too Many Requests".into(),
                    });
                }
                Attempt::RateLimited(delay) => {
                    warn!(
                        url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, backing off"
                    );
                    delay
                }
                Attempt::Failed(err) if is_retryable(&err) && !last => {
                    let delay = policy.backoff(attempt);
                    debug!(
                        url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "request failed ({}), retrying",
                        err
                    );
                    delay
                }
                Attempt::Failed(err) => return Err(err),
            };

            sleep(delay).await;
        }

        // Only reachable with an attempt budget of zero, which RetryPolicy rules out.
        Err(FetchError::InvalidPolicy("max_retries must be at least 1"))
    }

    async fn attempt(&self, url: &str, attempt: u32, policy: &RetryPolicy) -> Attempt {
        let response = match self.transport.get(url).await {
            Ok(response) => response,
            Err(err) => return Attempt::Failed(err),
        };

        if response.status == TOO_MANY_REQUESTS {
            let delay = response
                .retry_after
                .as_deref()
                .and_then(parse_retry_after)
                .unwrap_or_else(|| policy.backoff(attempt));
            return Attempt::RateLimited(delay);
        }

        if !response.is_success() {
            return Attempt::Failed(FetchError::Http {
                status: response.status,
                status_text: response.status_text,
            });
        }

        match serde_json::from_str(&response.body) {
            Ok(body) => Attempt::Done(body),
            Err(e) => Attempt::Failed(FetchError::Decode(e.to_string())),
        }
    }
}

fn is_retryable(err: &FetchError) -> bool {
    matches!(err, FetchError::Network { .. })
}
