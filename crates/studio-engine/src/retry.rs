use std::thread;
use std::time::Duration;

use studio_contracts::StudioError;
use tracing::warn;

const TRANSIENT_STATUS: [u16; 2] = [429, 503];
const TRANSIENT_CODES: [&str; 3] = ["RESOURCE_EXHAUSTED", "UNAVAILABLE", "429"];
const TRANSIENT_MESSAGE_MARKERS: [&str; 5] =
    ["429", "503", "Quota exceeded", "busy", "RESOURCE_EXHAUSTED"];

pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(120);

/// Exponential backoff for rate limit and overload failures.
///
/// `retries` counts calls after the first one; a policy with `retries: 3`
/// invokes the operation at most four times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn image() -> Self {
        Self {
            retries: 3,
            initial_delay: Duration::from_millis(2_000),
            multiplier: 1.5,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Slower policy for video submission; jobs are long and expensive.
    pub fn video_submit() -> Self {
        Self {
            retries: 5,
            initial_delay: Duration::from_millis(20_000),
            multiplier: 1.5,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    pub fn next_delay(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier).min(self.max_delay)
    }
}

/// Blocking wait used between attempts and poll ticks.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Details of a scheduled retry, passed to the observer before waiting.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryNotice {
    pub attempt: u32,
    pub retries_left: u32,
    pub delay: Duration,
    pub reason: String,
}

/// Rate limit, quota or overload signature. Anything else is permanent.
pub fn is_transient(err: &StudioError) -> bool {
    let Some(service) = err.service() else {
        return false;
    };
    if service
        .status
        .is_some_and(|status| TRANSIENT_STATUS.contains(&status))
    {
        return true;
    }
    if service
        .code
        .as_deref()
        .is_some_and(|code| TRANSIENT_CODES.contains(&code))
    {
        return true;
    }
    TRANSIENT_MESSAGE_MARKERS
        .iter()
        .any(|marker| service.message.contains(marker))
}

pub fn execute_with_retry<T, F, N>(
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
    mut operation: F,
    mut on_retry: N,
) -> Result<T, StudioError>
where
    F: FnMut() -> Result<T, StudioError>,
    N: FnMut(&RetryNotice),
{
    let mut retries_left = policy.retries;
    let mut delay = policy.initial_delay;
    let mut attempt = 1;

    loop {
        let err = match operation() {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_transient(&err) {
            return Err(err);
        }
        if retries_left == 0 {
            warn!(attempt, error = %err, "transient failures exhausted the retry budget");
            return Err(StudioError::Busy);
        }

        let notice = RetryNotice {
            attempt,
            retries_left,
            delay,
            reason: err.to_string(),
        };
        warn!(
            attempt,
            retries_left,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "quota or server limit hit, retrying"
        );
        on_retry(&notice);
        sleeper.sleep(delay);

        retries_left -= 1;
        delay = policy.next_delay(delay);
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use studio_contracts::ServiceError;

    use super::*;
    use crate::fakes::RecordingSleeper;

    fn rate_limited() -> StudioError {
        ServiceError::new(Some(429), Some("RESOURCE_EXHAUSTED"), "Resource exhausted").into()
    }

    fn bad_request() -> StudioError {
        ServiceError::new(Some(400), Some("INVALID_ARGUMENT"), "Unsupported image").into()
    }

    #[test]
    fn transient_signatures_are_classified() {
        assert!(is_transient(&rate_limited()));
        assert!(is_transient(
            &ServiceError::new(Some(503), None, "overloaded").into()
        ));
        assert!(is_transient(
            &ServiceError::new(None, Some("UNAVAILABLE"), "try later").into()
        ));
        assert!(is_transient(
            &ServiceError::new(Some(500), None, "Quota exceeded for metric").into()
        ));
        assert!(is_transient(
            &ServiceError::new(None, None, "The model is busy").into()
        ));
        assert!(!is_transient(&bad_request()));
        assert!(!is_transient(&StudioError::Transport("connection reset".into())));
        assert!(!is_transient(&StudioError::NoImage));
    }

    #[test]
    fn succeeds_after_two_transient_failures() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let mut notices = Vec::new();
        let result = execute_with_retry(
            &RetryPolicy::image(),
            &sleeper,
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(rate_limited())
                } else {
                    Ok("done")
                }
            },
            |notice| notices.push(notice.clone()),
        );
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_millis(2_000), Duration::from_millis(3_000)]
        );
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].attempt, 2);
    }

    #[test]
    fn exhausted_budget_yields_normalized_busy_error() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy {
            retries: 1,
            ..RetryPolicy::image()
        };
        let err = execute_with_retry(&policy, &sleeper, || Err::<(), _>(rate_limited()), |_| {})
            .unwrap_err();
        assert!(matches!(err, StudioError::Busy));
        assert!(!err.to_string().contains("Resource exhausted"));
    }

    #[test]
    fn permanent_failure_is_returned_after_one_call() {
        let sleeper = RecordingSleeper::default();
        let calls = Cell::new(0);
        let err = execute_with_retry(
            &RetryPolicy::video_submit(),
            &sleeper,
            || {
                calls.set(calls.get() + 1);
                Err::<(), _>(bad_request())
            },
            |_| {},
        )
        .unwrap_err();
        assert_eq!(calls.get(), 1);
        assert!(sleeper.recorded().is_empty());
        assert_eq!(err.service(), bad_request().service());
    }

    #[test]
    fn delay_growth_is_capped() {
        let policy = RetryPolicy {
            retries: 10,
            initial_delay: Duration::from_secs(60),
            multiplier: 1.5,
            max_delay: Duration::from_secs(100),
        };
        let sleeper = RecordingSleeper::default();
        let _ = execute_with_retry(&policy, &sleeper, || Err::<(), _>(rate_limited()), |_| {});
        let delays = sleeper.recorded();
        assert_eq!(delays.len(), 10);
        assert_eq!(delays[0], Duration::from_secs(60));
        assert_eq!(delays[1], Duration::from_secs(90));
        assert!(delays[2..].iter().all(|delay| *delay == Duration::from_secs(100)));
    }

    #[test]
    fn video_policy_is_more_patient() {
        let video = RetryPolicy::video_submit();
        let image = RetryPolicy::image();
        assert_eq!(video.retries, 5);
        assert_eq!(video.initial_delay, Duration::from_secs(20));
        assert!(video.initial_delay > image.initial_delay);
    }
}
