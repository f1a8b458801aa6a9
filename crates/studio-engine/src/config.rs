use std::env;
use std::time::Duration;

use crate::poller::PollPolicy;
use crate::retry::RetryPolicy;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub api_base: String,
    pub request_timeout: Duration,
    pub download_timeout: Duration,
    pub image_retry: RetryPolicy,
    pub video_retry: RetryPolicy,
    pub poll: PollPolicy,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            request_timeout: Duration::from_secs(120),
            download_timeout: Duration::from_secs(300),
            image_retry: RetryPolicy::image(),
            video_retry: RetryPolicy::video_submit(),
            poll: PollPolicy::default(),
        }
    }
}

impl StudioConfig {
    /// Defaults with environment overrides. Never reads credentials.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(base) = value("GEMINI_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(secs) = value("STUDIO_REQUEST_TIMEOUT_S").and_then(|raw| parse_secs(&raw)) {
            config.request_timeout = clamp_secs(secs, 15.0, 600.0);
        }
        if let Some(secs) = value("STUDIO_POLL_INTERVAL_S").and_then(|raw| parse_secs(&raw)) {
            config.poll.interval = clamp_secs(secs, 1.0, 60.0);
        }
        if let Some(secs) = value("STUDIO_RETRY_MAX_DELAY_S").and_then(|raw| parse_secs(&raw)) {
            let cap = clamp_secs(secs, 1.0, 900.0);
            config.image_retry.max_delay = cap;
            config.video_retry.max_delay = cap;
        }
        config
    }
}

fn parse_secs(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn clamp_secs(value: f64, min: f64, max: f64) -> Duration {
    Duration::from_secs_f64(value.clamp(min, max))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_match_service_policies() {
        let config = StudioConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.image_retry, RetryPolicy::image());
        assert_eq!(config.video_retry, RetryPolicy::video_submit());
        assert_eq!(config.poll.interval, Duration::from_secs(5));
        assert_eq!(config.poll.transient_backoff, Duration::from_secs(15));
    }

    #[test]
    fn overrides_are_trimmed_and_clamped() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GEMINI_API_BASE", " http://localhost:8080/v1beta/ "),
            ("STUDIO_REQUEST_TIMEOUT_S", "1"),
            ("STUDIO_POLL_INTERVAL_S", "2.5"),
            ("STUDIO_RETRY_MAX_DELAY_S", "nope"),
        ]);
        let config = StudioConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.api_base, "http://localhost:8080/v1beta");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.poll.interval, Duration::from_millis(2_500));
        assert_eq!(config.image_retry.max_delay, RetryPolicy::image().max_delay);
    }
}
