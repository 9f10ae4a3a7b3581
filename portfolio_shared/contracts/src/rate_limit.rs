use std::{future::Future, time::Duration};

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait RateLimitService: Send + Sync + 'static {
    /// Records an attempt for the given key.
    ///
    /// Returns `false` if the key has already used up all attempts allowed by
    /// `policy` in the current window. Rejected attempts are not counted.
    fn acquire(&self, key: &str, policy: RateLimitPolicy) -> impl Future<Output = bool> + Send;
}

/// Maximum number of attempts per key within a fixed time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u64,
    pub window: Duration,
}

#[cfg(feature = "mock")]
impl MockRateLimitService {
    pub fn with_acquire(mut self, key: String, policy: RateLimitPolicy, result: bool) -> Self {
        self.expect_acquire()
            .once()
            .with(
                mockall::predicate::eq(key),
                mockall::predicate::eq(policy),
            )
            .return_once(move |_, _| Box::pin(std::future::ready(result)));
        self
    }
}
