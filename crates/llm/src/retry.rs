use listingsmith_common::Result;
use std::time::Duration;
use tracing::warn;

use crate::llm_trait::CompletionClient;

/// Longest wait between two attempts
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Caller-requested retry behaviour
///
/// The default performs exactly one attempt. Only rate-limit errors are
/// retried; every other failure is returned immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each later one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Exponential backoff: base, 2*base, 4*base, ... capped at [`MAX_RETRY_DELAY`]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
    }
}

/// Run a completion under the given retry policy
pub async fn complete_with_retry(
    client: &dyn CompletionClient,
    system: &str,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String> {
    let mut retry = 0;

    loop {
        match client.complete(system, prompt).await {
            Err(e) if e.is_transient() && retry < policy.max_retries => {
                retry += 1;
                let delay = policy.delay_for(retry);
                warn!(
                    "Completion failed (retry {}/{}): {}. Retrying in {:?}...",
                    retry, policy.max_retries, e, delay
                );
                tokio::time::sleep(delay).await;
            }
            result => return result,
        }
    }
}
