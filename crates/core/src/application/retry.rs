// Retrying Transaction Executor
//
// Runs a unit of work and re-runs it from scratch when the store reports a
// transient write conflict. The unit of work MUST be safe to re-execute:
// it has to open its own transaction and roll back on failure, and any
// side effects outside the store must be idempotent.

use crate::application::cancel::CancelToken;
use crate::error::{AppError, ErrorClass, Result};
use crate::port::{Sleeper, TokioSleeper};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 100;

/// Retry policy for transient conflicts
///
/// The delay before retry number `n` (1-based) is `base_delay_ms ^ n`
/// milliseconds. There is no jitter, and no cap unless one is set with
/// [`RetryPolicy::with_max_delay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
    max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Create a new retry policy
    ///
    /// # Arguments
    /// * `max_attempts` - Total attempts including the first, at least 1
    /// * `base_delay_ms` - Exponent base in milliseconds, at least 2
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Result<Self> {
        if max_attempts == 0 {
            return Err(AppError::Validation(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if base_delay_ms < 2 {
            return Err(AppError::Validation(format!(
                "base_delay_ms must be at least 2, got {base_delay_ms}"
            )));
        }

        Ok(Self {
            max_attempts,
            base_delay_ms,
            max_delay: None,
        })
    }

    /// Clamp every backoff delay to `max_delay`
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay_ms(&self) -> u64 {
        self.base_delay_ms
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = Duration::from_millis(self.base_delay_ms.saturating_pow(attempt));
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

/// Executes units of work with retry on transient conflicts.
///
/// Holds no per-call state, so one executor is shared by every request.
pub struct TransactionExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl TransactionExecutor {
    pub fn new(policy: RetryPolicy, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { policy, sleeper }
    }

    pub fn with_tokio(policy: RetryPolicy) -> Self {
        Self::new(policy, Arc::new(TokioSleeper))
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `unit_of_work` until it succeeds, fails terminally, or the
    /// attempts run out.
    ///
    /// Returns:
    /// - the unit's value on the first success
    /// - a terminal error unchanged, after a single attempt
    /// - `AppError::TransactionFailed` for unclassified errors and when every
    ///   attempt hit a transient conflict
    pub async fn run<T, F, Fut>(&self, unit_of_work: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute(unit_of_work, None).await
    }

    /// Like [`run`](Self::run), but gives up with `AppError::Cancelled` once
    /// `cancel` fires. Cancellation is observed before each attempt and
    /// during backoff, never in the middle of a unit of work.
    pub async fn run_cancellable<T, F, Fut>(&self, unit_of_work: F, cancel: &CancelToken) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.execute(unit_of_work, Some(cancel.clone())).await
    }

    async fn execute<T, F, Fut>(
        &self,
        mut unit_of_work: F,
        mut cancel: Option<CancelToken>,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 1;

        loop {
            if cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                debug!(attempt, "Retry loop cancelled");
                return Err(AppError::Cancelled);
            }

            let err = match unit_of_work().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            match err.class() {
                ErrorClass::Terminal => return Err(err),
                ErrorClass::Unclassified => {
                    error!(attempt, error = %err, "Unit of work failed with unclassified error");
                    return Err(AppError::TransactionFailed);
                }
                ErrorClass::Transient => {}
            }

            if attempt >= max_attempts {
                warn!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "Retry attempts exhausted"
                );
                return Err(AppError::TransactionFailed);
            }

            let delay = self.policy.backoff(attempt);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay_millis(delay),
                error = %err,
                "Transient conflict, retrying"
            );

            match cancel.as_mut() {
                Some(token) => {
                    tokio::select! {
                        _ = self.sleeper.sleep(delay) => {}
                        _ = token.cancelled() => {
                            debug!(attempt, "Retry loop cancelled during backoff");
                            return Err(AppError::Cancelled);
                        }
                    }
                }
                None => self.sleeper.sleep(delay).await,
            }

            attempt += 1;
        }
    }
}

/// Run a unit of work with the given policy and a real timer
pub async fn run_with_retry<T, F, Fut>(unit_of_work: F, policy: RetryPolicy) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    TransactionExecutor::with_tokio(policy)
        .run(unit_of_work)
        .await
}

/// Milliseconds for logging, saturating instead of truncating
fn delay_millis(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::cancel::cancel_channel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        fn delays(&self) -> Vec<Duration> {
            self.delays.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }

    fn executor(max_attempts: u32) -> (TransactionExecutor, Arc<RecordingSleeper>) {
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy::new(max_attempts, 100).unwrap();
        (TransactionExecutor::new(policy, sleeper.clone()), sleeper)
    }

    fn conflict() -> AppError {
        AppError::TransientConflict("could not serialize access".to_string())
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = RetryPolicy::new(0, 100).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(RetryPolicy::new(1, 1).is_err());
        tokio_test::assert_ok!(RetryPolicy::new(1, 2));
    }

    #[test]
    fn test_backoff_is_base_to_the_attempt() {
        let policy = RetryPolicy::new(5, 100).unwrap();
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(10_000));
        assert_eq!(policy.backoff(3), Duration::from_millis(1_000_000));
    }

    #[test]
    fn test_backoff_cap() {
        let policy = RetryPolicy::new(5, 100)
            .unwrap()
            .with_max_delay(Duration::from_secs(5));
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_secs(5));
        assert_eq!(policy.backoff(40), Duration::from_secs(5));
    }

    #[test]
    fn test_delay_millis_saturates() {
        assert_eq!(delay_millis(Duration::from_millis(250)), 250);
        assert_eq!(delay_millis(Duration::MAX), u64::MAX);
    }

    #[tokio::test]
    async fn test_saturated_backoff_is_retried_without_overflow() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let policy = RetryPolicy::new(3, u64::MAX).unwrap();
        let exec = TransactionExecutor::new(policy, sleeper.clone());

        let result: Result<()> = exec.run(|| async { Err(conflict()) }).await;

        assert!(matches!(result, Err(AppError::TransactionFailed)));
        let saturated = Duration::from_millis(u64::MAX);
        assert_eq!(sleeper.delays(), vec![saturated, saturated]);
    }

    #[tokio::test]
    async fn test_success_first_try_runs_once() {
        let (exec, sleeper) = executor(3);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = exec
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, AppError>(42)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_transient_conflict_bounded_by_max_attempts() {
        let (exec, sleeper) = executor(4);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = exec
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(conflict())
            })
            .await;

        assert!(matches!(result, Err(AppError::TransactionFailed)));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // one sleep between each pair of attempts
        assert_eq!(sleeper.delays().len(), 3);
    }

    #[tokio::test]
    async fn test_terminal_error_not_retried() {
        let (exec, sleeper) = executor(5);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = exec
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Duplicate("post already liked".to_string()))
            })
            .await;

        match result {
            Err(AppError::Duplicate(msg)) => assert_eq!(msg, "post already liked"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_unclassified_error_is_masked() {
        let (exec, _) = executor(5);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = exec
            .run(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Database("disk I/O error at page 7".to_string()))
            })
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::TransactionFailed));
        assert!(!err.to_string().contains("disk"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_strictly_increasing() {
        let (exec, sleeper) = executor(5);

        let _: Result<()> = exec.run(|| async { Err(conflict()) }).await;

        let delays = sleeper.delays();
        assert_eq!(delays.len(), 4);
        for pair in delays.windows(2) {
            assert!(pair[1] > pair[0], "{:?} not greater than {:?}", pair[1], pair[0]);
        }
    }

    #[tokio::test]
    async fn test_recovers_after_transient_conflicts() {
        let (exec, sleeper) = executor(3);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = exec
            .run(move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(conflict())
                } else {
                    Ok("committed")
                }
            })
            .await;

        assert_eq!(result.unwrap(), "committed");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_millis(100), Duration::from_millis(10_000)]
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let (exec, _) = executor(3);
        let (sender, token) = cancel_channel();
        sender.cancel();
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<()> = exec
            .run_cancellable(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                },
                &token,
            )
            .await;

        assert!(matches!(result, Err(AppError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_backoff() {
        let exec = TransactionExecutor::with_tokio(RetryPolicy::new(3, 100).unwrap());
        let (sender, token) = cancel_channel();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let handle = tokio::spawn(async move {
            exec.run_cancellable(
                move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Err::<(), _>(conflict())
                    }
                },
                &token,
            )
            .await
        });

        // first backoff is 100ms; cancel halfway through it
        tokio::time::sleep(Duration::from_millis(50)).await;
        sender.cancel();

        let result = handle.await.unwrap();
        assert!(matches!(result, Err(AppError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_retry_sleeps_on_tokio_timer() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let start = tokio::time::Instant::now();

        let result = run_with_retry(
            move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(conflict())
                } else {
                    Ok(())
                }
            },
            RetryPolicy::default(),
        )
        .await;

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    // No internal timeout: a unit of work that never finishes holds the
    // executor until the caller gives up.
    #[tokio::test(start_paused = true)]
    async fn test_hung_unit_of_work_is_not_timed_out() {
        let (exec, _) = executor(3);

        let outcome = tokio::time::timeout(
            Duration::from_secs(60),
            exec.run(|| std::future::pending::<Result<()>>()),
        )
        .await;

        assert!(outcome.is_err(), "executor should still be waiting");
    }
}
