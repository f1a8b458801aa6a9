use std::time::Duration;

use studio_contracts::{Credential, StudioError};
use tracing::{debug, warn};

use crate::retry::{is_transient, Sleeper};
use crate::service::{GenerativeService, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before every status request.
    pub interval: Duration,
    /// Extra wait after a transient status failure. Not counted against
    /// any budget; polling has no attempt cap.
    pub transient_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            transient_backoff: Duration::from_secs(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Polled { tick: u32, done: bool },
    Backoff { tick: u32, delay: Duration, reason: String },
}

pub struct OperationPoller<'a> {
    service: &'a dyn GenerativeService,
    sleeper: &'a dyn Sleeper,
    policy: PollPolicy,
}

impl<'a> OperationPoller<'a> {
    pub fn new(
        service: &'a dyn GenerativeService,
        sleeper: &'a dyn Sleeper,
        policy: PollPolicy,
    ) -> Self {
        Self {
            service,
            sleeper,
            policy,
        }
    }

    /// Polls until the operation is done and returns its result URI.
    ///
    /// The remote side has no cancel call. A stuck job keeps polling until
    /// it reports done or a permanent error surfaces.
    pub fn wait_for_video(
        &self,
        credential: &Credential,
        operation: Operation,
        mut on_event: impl FnMut(&PollEvent),
    ) -> Result<String, StudioError> {
        let mut operation = operation;
        let mut tick = 0;

        while !operation.done {
            self.sleeper.sleep(self.policy.interval);
            tick += 1;
            operation = loop {
                match self.service.get_operation(credential, &operation) {
                    Ok(next) => break next,
                    Err(err) if is_transient(&err) => {
                        warn!(
                            tick,
                            operation = %operation.name,
                            error = %err,
                            "transient error while polling, backing off"
                        );
                        on_event(&PollEvent::Backoff {
                            tick,
                            delay: self.policy.transient_backoff,
                            reason: err.to_string(),
                        });
                        self.sleeper.sleep(self.policy.transient_backoff);
                    }
                    Err(err) => return Err(err),
                }
            };
            debug!(tick, operation = %operation.name, done = operation.done, "operation polled");
            on_event(&PollEvent::Polled {
                tick,
                done: operation.done,
            });
        }

        if let Some(error) = operation.error {
            return Err(error.into());
        }
        operation.video_uri.ok_or(StudioError::NoVideoResult)
    }
}
