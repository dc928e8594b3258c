//! Retry policy, backoff schedule and failure classification.

use std::error::Error as StdError;
use std::time::Duration;

/// Status codes retried by default.
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Error text fragments that mark a transport failure as transient.
const RETRYABLE_ERROR_FRAGMENTS: [&str; 4] = [
    "connection refused",
    "timeout",
    "temporary failure",
    "network is unreachable",
];

/// Backoff and retryable-status policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
    /// Status codes that trigger a retry.
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            retryable_status_codes: DEFAULT_RETRYABLE_STATUS_CODES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Exponential policy with the given base and cap.
    pub fn exponential(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
            ..Default::default()
        }
    }

    /// Add status codes to retry on, on top of the current set.
    pub fn with_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        for code in codes {
            if !self.retryable_status_codes.contains(&code) {
                self.retryable_status_codes.push(code);
            }
        }
        self
    }

    /// Delay before the attempt following `attempt` (0-indexed).
    ///
    /// `min(max_delay, base_delay * 2^attempt)`, saturating.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Check if a status code should trigger a retry.
    pub fn should_retry_status(&self, status: u16, extra: &[u16]) -> bool {
        self.retryable_status_codes.contains(&status) || extra.contains(&status)
    }

    /// Decide where the retry loop goes after an attempt.
    ///
    /// `attempt` is 0-indexed, `max_attempts` is the total budget.
    pub fn next_transition(
        &self,
        result: AttemptResult,
        attempt: u32,
        max_attempts: u32,
        extra_status_codes: &[u16],
    ) -> Transition {
        let attempts_remain = attempt + 1 < max_attempts;
        let retry = || {
            if attempts_remain {
                Transition::Backoff(self.delay_for_attempt(attempt))
            } else {
                Transition::Exhausted
            }
        };

        match result {
            AttemptResult::Transport { .. } => retry(),
            AttemptResult::BodyRead { status } if (200..300).contains(&status) => {
                Transition::Abort
            }
            AttemptResult::BodyRead { .. } => retry(),
            AttemptResult::Status(status) if self.should_retry_status(status, extra_status_codes) => {
                retry()
            }
            AttemptResult::Status(_) => Transition::Done,
        }
    }
}

/// What a single attempt produced, stripped to what the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptResult {
    /// No response was received. Always retried while attempts remain.
    Transport {
        /// Whether the failure looks transient, for logging.
        retryable: bool,
    },
    /// A response arrived but its body could not be read.
    BodyRead {
        /// Status of that response.
        status: u16,
    },
    /// A complete response with this status.
    Status(u16),
}

/// Where the retry loop goes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Sleep for the delay, then attempt again.
    Backoff(Duration),
    /// Give up and report the last failure.
    Exhausted,
    /// Return the response to the caller.
    Done,
    /// Fail immediately without retrying.
    Abort,
}

/// Check if a status code is retryable under the default policy.
pub fn is_retryable_status_code(status: u16) -> bool {
    DEFAULT_RETRYABLE_STATUS_CODES.contains(&status)
}

/// Check if a transport error looks transient.
///
/// Inspects the whole source chain, since HTTP stacks usually bury the OS
/// error several levels deep.
pub fn is_retryable_error(err: &(dyn StdError + 'static)) -> bool {
    if let Some(e) = err.downcast_ref::<reqwest::Error>()
        && (e.is_timeout() || e.is_connect())
    {
        return true;
    }

    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if RETRYABLE_ERROR_FRAGMENTS
            .iter()
            .any(|fragment| text.contains(fragment))
        {
            return true;
        }
        current = e.source();
    }
    false
}
