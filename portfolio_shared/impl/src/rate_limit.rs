use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use portfolio_di::Build;
use portfolio_shared_contracts::{
    rate_limit::{RateLimitPolicy, RateLimitService},
    time::TimeService,
};
use portfolio_utils::trace_instrument;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory fixed window rate limiter.
///
/// Records live for the lifetime of the process and are reset lazily once
/// their window has expired. The state is not shared between multiple
/// instances of the server.
#[derive(Debug, Clone, Build)]
pub struct RateLimitServiceImpl<Time> {
    time: Time,
    #[state]
    state: Arc<State>,
}

#[derive(Debug, Default)]
struct State {
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

#[derive(Debug, Clone, Copy)]
struct RateLimitRecord {
    count: u64,
    reset_at: DateTime<Utc>,
}

impl<Time> RateLimitService for RateLimitServiceImpl<Time>
where
    Time: TimeService,
{
    #[trace_instrument(skip(self))]
    async fn acquire(&self, key: &str, policy: RateLimitPolicy) -> bool {
        let now = self.time.now();

        // lookup, reset and increment must happen under the same lock
        let mut records = self.state.records.lock().await;
        match records.get_mut(key) {
            Some(record) if now <= record.reset_at => {
                if record.count >= policy.max_requests {
                    debug!(count = record.count, reset_at = %record.reset_at, "rate limit exceeded");
                    return false;
                }
                record.count += 1;
            }
            _ => {
                records.insert(
                    key.into(),
                    RateLimitRecord {
                        count: 1,
                        reset_at: now + policy.window,
                    },
                );
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use portfolio_shared_contracts::time::MockTimeService;

    use super::*;
    use crate::time::TimeServiceImpl;

    const POLICY: RateLimitPolicy = RateLimitPolicy {
        max_requests: 5,
        window: Duration::from_secs(3600),
    };

    fn time_at(times: &[DateTime<Utc>]) -> MockTimeService {
        let mut time = MockTimeService::new();
        let mut seq = mockall::Sequence::new();
        for &t in times {
            time.expect_now()
                .once()
                .in_sequence(&mut seq)
                .return_const(t);
        }
        time
    }

    fn make_sut<Time>(time: Time) -> RateLimitServiceImpl<Time> {
        RateLimitServiceImpl {
            time,
            state: Default::default(),
        }
    }

    #[tokio::test]
    async fn sixth_attempt_in_window_is_rejected() {
        // Arrange
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let times = (0..6)
            .map(|i| start + Duration::from_secs(i * 60))
            .collect::<Vec<_>>();
        let sut = make_sut(time_at(&times));

        // Act
        let mut results = Vec::new();
        for _ in 0..6 {
            results.push(sut.acquire("contact:10.0.0.1", POLICY).await);
        }

        // Assert
        assert_eq!(results, [true, true, true, true, true, false]);
    }

    #[tokio::test]
    async fn window_expiry_resets_count() {
        // Arrange
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let mut times = vec![start; 6];
        times.push(start + POLICY.window);
        times.push(start + POLICY.window + Duration::from_secs(1));
        times.push(start + POLICY.window + Duration::from_secs(2));
        let sut = make_sut(time_at(&times));

        // Act
        let mut results = Vec::new();
        for _ in 0..9 {
            results.push(sut.acquire("contact:10.0.0.1", POLICY).await);
        }

        // Assert
        assert_eq!(
            results,
            [true, true, true, true, true, false, false, true, true]
        );
    }

    #[tokio::test]
    async fn keys_are_independent() {
        // Arrange
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let sut = make_sut(time_at(&[now; 7]));

        // Act
        for _ in 0..5 {
            assert!(sut.acquire("contact:10.0.0.1", POLICY).await);
        }
        let first = sut.acquire("contact:10.0.0.1", POLICY).await;
        let second = sut.acquire("contact:10.0.0.2", POLICY).await;

        // Assert
        assert!(!first);
        assert!(second);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_attempts_never_exceed_limit() {
        // Arrange
        let sut = make_sut(TimeServiceImpl);

        // Act
        let handles = (0..64)
            .map(|_| {
                let sut = sut.clone();
                tokio::spawn(async move { sut.acquire("contact:unknown", POLICY).await })
            })
            .collect::<Vec<_>>();

        let mut accepted = 0u64;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }

        // Assert
        assert_eq!(accepted, POLICY.max_requests);
    }
}
