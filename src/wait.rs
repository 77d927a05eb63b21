use crate::error::WaitError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// Poll `condition` every `period` until it returns `true` or `total` time elapses.
///
/// The condition is always checked at least once, and once more when `total` runs out.
pub async fn wait_until<F, Fut>(mut condition: F, total: Duration, period: Duration) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    if period.is_zero() {
        return Err(WaitError::ZeroPeriod);
    }
    if period > total {
        return Err(WaitError::PeriodExceedsTotal { period, total });
    }

    let deadline = Instant::now() + total;
    loop {
        if condition().await {
            return Ok(());
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(WaitError::TimedOut { total });
        }

        trace!("condition not met, next check in {:?}", period.min(deadline - now));
        tokio::time::sleep(period.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_period_longer_than_total() {
        let err = wait_until(|| async { true }, Duration::from_secs(1), Duration::from_secs(2))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            WaitError::PeriodExceedsTotal {
                period: Duration::from_secs(2),
                total:  Duration::from_secs(1),
            }
        );
    }

    #[tokio::test]
    async fn test_zero_period() {
        let checks = &AtomicUsize::new(0);
        let err = wait_until(
            move || async move { checks.fetch_add(1, Ordering::SeqCst) > 0 },
            Duration::from_secs(1),
            Duration::ZERO,
        )
        .await
        .unwrap_err();
        assert_eq!(err, WaitError::ZeroPeriod);
        assert_eq!(checks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_condition_met() {
        let checks = &AtomicUsize::new(0);
        wait_until(
            move || async move { checks.fetch_add(1, Ordering::SeqCst) >= 2 },
            Duration::from_secs(10),
            Duration::from_secs(1),
        )
        .await
        .unwrap();
        assert_eq!(checks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out() {
        let checks = &AtomicUsize::new(0);
        let started = Instant::now();
        let err = wait_until(
            move || async move {
                checks.fetch_add(1, Ordering::SeqCst);
                false
            },
            Duration::from_secs(3),
            Duration::from_secs(1),
        )
        .await
        .unwrap_err();
        assert_eq!(err, WaitError::TimedOut { total: Duration::from_secs(3) });
        assert_eq!(started.elapsed(), Duration::from_secs(3));
        assert_eq!(checks.load(Ordering::SeqCst), 4);
    }
}
