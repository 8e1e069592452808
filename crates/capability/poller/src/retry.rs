//! 有界重试组合子
//!
//! 与具体操作无关：任意返回 `Result` 的异步操作都可套用。

use std::future::Future;
use std::time::Duration;

/// 重试策略：总尝试次数与固定间隔。
///
/// 间隔只发生在两次尝试之间，最后一次失败后不再等待。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

/// 重试耗尽，携带最后一次错误。
#[derive(Debug, thiserror::Error)]
#[error("gave up after {attempts} attempts: {last}")]
pub struct RetryError<E> {
    pub attempts: u32,
    pub last: E,
}

/// 按策略执行 `operation`，首次成功即返回。
///
/// `operation` 接收从 1 开始的尝试序号；每次失败先调用 `on_failure`，再决定是否等待重试。
pub async fn with_retry<T, E, F, Fut, L>(
    policy: &RetryPolicy,
    mut operation: F,
    mut on_failure: L,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    L: FnMut(u32, &E),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                on_failure(attempt, &err);
                if attempt >= max_attempts {
                    return Err(RetryError {
                        attempts: attempt,
                        last: err,
                    });
                }
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts_with_delays_between() {
        let calls = Cell::new(0u32);
        let mut failures = Vec::new();
        let start = Instant::now();

        let result: Result<(), RetryError<&str>> = with_retry(
            &RetryPolicy::default(),
            |_| {
                calls.set(calls.get() + 1);
                async { Err("timeout") }
            },
            |attempt, err| failures.push((attempt, *err)),
        )
        .await;

        let err = result.expect_err("exhausted");
        assert_eq!(err.attempts, 3);
        assert_eq!(err.last, "timeout");
        assert_eq!(calls.get(), 3);
        assert_eq!(failures, vec![(1, "timeout"), (2, "timeout"), (3, "timeout")]);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_on_first_success() {
        let start = Instant::now();
        let result: Result<u32, RetryError<String>> = with_retry(
            &RetryPolicy::default(),
            |attempt| async move {
                if attempt < 2 {
                    Err(format!("attempt {attempt} failed"))
                } else {
                    Ok(attempt)
                }
            },
            |_, _| {},
        )
        .await;

        assert_eq!(result.expect("second attempt"), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_does_not_wait() {
        let start = Instant::now();
        let result: Result<&str, RetryError<&str>> =
            with_retry(&RetryPolicy::default(), |_| async { Ok("ok") }, |_, _| {}).await;
        assert_eq!(result.expect("ok"), "ok");
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn policy_keeps_at_least_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_millis(10));
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn retry_error_displays_last_error() {
        let err = RetryError {
            attempts: 3,
            last: "connection refused",
        };
        assert_eq!(err.to_string(), "gave up after 3 attempts: connection refused");
    }
}
