use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use backoff::{future::retry, ExponentialBackoff};
use log::warn;

/// How often and how patiently a failing call is retried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_interval: Duration,
    pub max_interval: Duration,
}

impl RetryPolicy {
    pub fn with_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    #[inline]
    fn backoff_config(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            max_interval: self.max_interval,
            ..Default::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_millis(5000),
        }
    }
}

/// Retry `f` while it fails with an error `is_transient` accepts,
/// at most `policy.max_retries` times after the first attempt.
pub async fn retry_transient<I, E, F, Fut, P>(policy: &RetryPolicy, is_transient: P, f: F) -> Result<I, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<I, E>>,
    P: Fn(&E) -> bool,
{
    let cur_times = AtomicUsize::new(0);
    retry(policy.backoff_config(), || async {
        let times = cur_times.fetch_add(1, Ordering::AcqRel) + 1;
        if times > 1 {
            warn!("retrying for the {} time", times - 1);
        }
        f().await
            .map_err(|err| {
                if is_transient(&err) && times <= policy.max_retries {
                    backoff::Error::transient(err)
                } else {
                    backoff::Error::permanent(err)
                }
            })
    })
        .await
}
