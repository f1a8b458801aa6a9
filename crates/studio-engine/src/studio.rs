use std::sync::Arc;

use studio_contracts::events::{EventLog, StudioEvent};
use studio_contracts::requests::{
    GenerationRequest, OutfitSwap, ProductPoster, RequestBuilder, ServiceCall, VideoPrompt,
};
use studio_contracts::{Credential, ObjectStore, StudioError};
use tracing::{info, warn};

use crate::config::StudioConfig;
use crate::gemini::GeminiClient;
use crate::materialize::{materialize_image, materialize_video, GenerationResult};
use crate::poller::{OperationPoller, PollEvent, PollPolicy};
use crate::retry::{execute_with_retry, RetryNotice, RetryPolicy, Sleeper, ThreadSleeper};
use crate::service::GenerativeService;

/// Entry point for the three studio features.
///
/// Every call runs build, submit, poll and materialize strictly in order on
/// the calling thread. Calls are independent: nothing prevents two requests
/// from running at once, and nothing de-duplicates them.
pub struct Studio {
    service: Arc<dyn GenerativeService>,
    sleeper: Arc<dyn Sleeper>,
    objects: ObjectStore,
    image_retry: RetryPolicy,
    video_retry: RetryPolicy,
    poll: PollPolicy,
    events: Option<EventLog>,
}

impl Studio {
    pub fn new(service: Arc<dyn GenerativeService>, objects: ObjectStore) -> Self {
        Self {
            service,
            sleeper: Arc::new(ThreadSleeper),
            objects,
            image_retry: RetryPolicy::image(),
            video_retry: RetryPolicy::video_submit(),
            poll: PollPolicy::default(),
            events: None,
        }
    }

    /// Studio backed by the Gemini REST API.
    pub fn gemini(config: &StudioConfig, objects: ObjectStore) -> Self {
        Self::new(Arc::new(GeminiClient::new(config)), objects).with_config(config)
    }

    pub fn with_config(mut self, config: &StudioConfig) -> Self {
        self.image_retry = config.image_retry;
        self.video_retry = config.video_retry;
        self.poll = config.poll;
        self
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_events(mut self, events: EventLog) -> Self {
        self.events = Some(events);
        self
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn swap_outfit(
        &self,
        input: &OutfitSwap<'_>,
        credential: Credential,
    ) -> Result<GenerationResult, StudioError> {
        self.run(input, credential)
    }

    pub fn generate_poster(
        &self,
        input: &ProductPoster<'_>,
        credential: Credential,
    ) -> Result<GenerationResult, StudioError> {
        self.run(input, credential)
    }

    pub fn generate_video(
        &self,
        input: &VideoPrompt<'_>,
        credential: Credential,
    ) -> Result<GenerationResult, StudioError> {
        self.run(input, credential)
    }

    /// Builds and executes any request. Input errors surface before the
    /// service is contacted.
    pub fn run(
        &self,
        builder: &dyn RequestBuilder,
        credential: Credential,
    ) -> Result<GenerationResult, StudioError> {
        let feature = builder.feature();
        let request = builder.build(credential)?;
        self.record(StudioEvent::GenerationStarted {
            feature,
            model: request.call.model().to_string(),
            model_note: request.model_note.clone(),
            inputs: request.inputs.clone(),
        });

        let outcome = self.execute(&request);
        match &outcome {
            Ok(result) => {
                info!(%feature, kind = ?result.kind(), "generation finished");
                self.record(StudioEvent::ResultMaterialized {
                    feature,
                    kind: result.kind(),
                });
            }
            Err(err) => {
                warn!(%feature, error = %err, "generation failed");
                self.record(StudioEvent::GenerationFailed {
                    feature,
                    error: err.to_string(),
                    credential_rejected: err.is_credential_rejected(),
                });
            }
        }
        outcome
    }

    /// Explicit round trip confirming the credential before it is marked as
    /// usable.
    pub fn check_credential(&self, credential: &Credential) -> Result<(), StudioError> {
        self.service.check_credential(credential)
    }

    fn execute(&self, request: &GenerationRequest) -> Result<GenerationResult, StudioError> {
        let credential = &request.credential;
        match &request.call {
            ServiceCall::ImageEdit(call) => {
                let response = execute_with_retry(
                    &self.image_retry,
                    self.sleeper.as_ref(),
                    || self.service.generate_content(credential, call),
                    |notice| self.emit_retry(notice),
                )?;
                materialize_image(&response)
            }
            ServiceCall::Video(call) => {
                let operation = execute_with_retry(
                    &self.video_retry,
                    self.sleeper.as_ref(),
                    || self.service.generate_videos(credential, call),
                    |notice| self.emit_retry(notice),
                )?;
                info!(operation = %operation.name, "video operation submitted");
                self.record(StudioEvent::OperationSubmitted {
                    operation: operation.name.clone(),
                    done: operation.done,
                });

                let poller =
                    OperationPoller::new(self.service.as_ref(), self.sleeper.as_ref(), self.poll);
                let uri = poller.wait_for_video(credential, operation, |event| {
                    self.emit_poll(event)
                })?;
                materialize_video(self.service.as_ref(), &self.objects, credential, &uri)
            }
        }
    }

    fn emit_retry(&self, notice: &RetryNotice) {
        self.record(StudioEvent::RetryScheduled {
            attempt: notice.attempt,
            retries_left: notice.retries_left,
            delay_ms: notice.delay.as_millis() as u64,
            reason: notice.reason.clone(),
        });
    }

    fn emit_poll(&self, event: &PollEvent) {
        let event = match event {
            PollEvent::Polled { tick, done } => StudioEvent::OperationPolled {
                tick: *tick,
                done: *done,
            },
            PollEvent::Backoff {
                tick,
                delay,
                reason,
            } => StudioEvent::PollBackoff {
                tick: *tick,
                delay_ms: delay.as_millis() as u64,
                reason: reason.clone(),
            },
        };
        self.record(event);
    }

    fn record(&self, event: StudioEvent) {
        let Some(events) = self.events.as_ref() else {
            return;
        };
        if let Err(err) = events.record(&event) {
            warn!(event = event.name(), error = %err, "failed to write event");
        }
    }
}
