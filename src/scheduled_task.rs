use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use rocket::tokio::{
    self,
    task::{JoinError, JoinHandle},
    time::Duration,
};

/// A task that runs by itself at a given point in the future, unless cancelled first.
pub struct ScheduledTask<T> {
    handle: JoinHandle<T>,
    run_at: DateTime<Utc>,
}

impl<T> ScheduledTask<T>
where
    T: Send + 'static,
{
    /// Schedule the given task to execute at time `run_at`.
    /// If `run_at` is in the past, the task will execute immediately.
    pub fn new<Fut>(task: Fut, run_at: DateTime<Utc>) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        let delay = until(run_at);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await
        });
        Self { handle, run_at }
    }

    /// When the task is due to run.
    pub fn run_at(&self) -> DateTime<Utc> {
        self.run_at
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task. Returns true iff it had already completed before we could cancel it.
    pub async fn cancel(self) -> bool {
        self.handle.abort();
        self.handle.await.is_ok()
    }
}

/// Awaiting a `ScheduledTask` waits for it to run.
impl<T> Future for ScheduledTask<T> {
    type Output = Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.handle).poll(cx)
    }
}

/// Time from now until `datetime`, or zero if it has passed.
pub fn until(datetime: DateTime<Utc>) -> Duration {
    (datetime - Utc::now()).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;

    #[test]
    fn past_is_zero() {
        assert_eq!(until(Utc::now() - ChronoDuration::minutes(1)), Duration::ZERO);
        assert!(until(Utc::now() + ChronoDuration::minutes(1)) > Duration::from_secs(58));
    }

    #[rocket::async_test]
    async fn runs_when_due() {
        let task = ScheduledTask::new(async { 42 }, Utc::now() + ChronoDuration::milliseconds(20));
        assert!(!task.is_finished());
        assert_eq!(task.await.unwrap(), 42);
    }

    #[rocket::async_test]
    async fn cancel_before_due() {
        let task = ScheduledTask::new(async { 42 }, Utc::now() + ChronoDuration::hours(1));
        assert!(!task.cancel().await);
    }

    #[rocket::async_test]
    async fn cancel_after_completion() {
        let task = ScheduledTask::new(async { 42 }, Utc::now());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(task.is_finished());
        assert!(task.cancel().await);
    }
}
