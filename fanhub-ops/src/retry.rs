use anyhow::Result;
use std::time::Duration;

use crate::error::OpsError;
use crate::pacing::Pause;

/// How often and how patiently a failing operation is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Same retry count, no sleeping between attempts
    pub fn without_delay(self) -> Self {
        Self {
            delay: Duration::ZERO,
            ..self
        }
    }
}

/// Run `op` until it succeeds or the policy is exhausted
pub fn retry<T, F>(label: &str, policy: RetryPolicy, mut op: F) -> Result<T, OpsError>
where
    F: FnMut() -> Result<T>,
{
    let attempts = policy.max_retries + 1;
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation = label, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(
                    operation = label,
                    attempt,
                    max_attempts = attempts,
                    error = %format!("{:#}", e),
                    "Attempt failed, retrying"
                );
                Pause(policy.delay).wait();
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(operation = label, attempts, error = %format!("{:#}", e), "Giving up");
                return Err(OpsError::RetriesExhausted {
                    label: label.to_string(),
                    attempts,
                    last_error: e,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_succeeds_first_time() {
        let mut calls = 0;
        let value = retry("op", quick(3), || {
            calls += 1;
            Ok(7)
        })
        .unwrap();
        assert_eq!(value, 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_recovers_after_failures() {
        let mut calls = 0;
        let value = retry("op", quick(3), || {
            calls += 1;
            if calls < 3 {
                anyhow::bail!("busy");
            }
            Ok(calls)
        })
        .unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn test_exhausted_after_max_retries() {
        let mut calls = 0;
        let err = retry("delete user", quick(3), || -> Result<()> {
            calls += 1;
            anyhow::bail!("locked")
        })
        .unwrap_err();

        assert_eq!(calls, 4);
        match err {
            OpsError::RetriesExhausted { label, attempts, .. } => {
                assert_eq!(label, "delete user");
                assert_eq!(attempts, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_secs(1));
        assert_eq!(policy.without_delay().delay, Duration::ZERO);
    }
}
