//! Scripted collaborators shared by the engine tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Url;
use studio_contracts::requests::{ImageEditCall, VideoCall};
use studio_contracts::{Credential, ServiceError, StudioError};

use crate::retry::Sleeper;
use crate::service::{ContentResponse, FetchedBody, GenerativeService, Operation};

#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().map(|rows| rows.clone()).unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        if let Ok(mut rows) = self.sleeps.lock() {
            rows.push(duration);
        }
    }
}

pub fn done_operation(uri: &str) -> Operation {
    Operation {
        name: "operations/1".to_string(),
        done: true,
        video_uri: Some(uri.to_string()),
        error: None,
    }
}

fn unscripted(call: &str) -> StudioError {
    StudioError::Service(ServiceError::new(
        Some(500),
        Some("TEST_UNSCRIPTED"),
        format!("no scripted response for {call}"),
    ))
}

/// Replays queued responses per endpoint and records what was sent.
#[derive(Default)]
pub struct ScriptedService {
    content: Mutex<VecDeque<Result<ContentResponse, StudioError>>>,
    submits: Mutex<VecDeque<Result<Operation, StudioError>>>,
    polls: Mutex<VecDeque<Result<Operation, StudioError>>>,
    fetches: Mutex<VecDeque<Result<FetchedBody, StudioError>>>,
    content_calls: Mutex<Vec<ImageEditCall>>,
    video_calls: Mutex<Vec<VideoCall>>,
    poll_count: Mutex<usize>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn push_content(&self, response: Result<ContentResponse, StudioError>) {
        push(&self.content, response);
    }

    pub fn push_submit(&self, response: Result<Operation, StudioError>) {
        push(&self.submits, response);
    }

    pub fn push_poll(&self, response: Result<Operation, StudioError>) {
        push(&self.polls, response);
    }

    pub fn push_fetch(&self, response: Result<FetchedBody, StudioError>) {
        push(&self.fetches, response);
    }

    pub fn content_calls(&self) -> Vec<ImageEditCall> {
        self.content_calls.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn video_calls(&self) -> Vec<VideoCall> {
        self.video_calls.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn poll_calls(&self) -> usize {
        self.poll_count.lock().map(|count| *count).unwrap_or_default()
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn remote_calls(&self) -> usize {
        self.content_calls().len()
            + self.video_calls().len()
            + self.poll_calls()
            + self.fetched_urls().len()
    }
}

fn push<T>(queue: &Mutex<VecDeque<T>>, value: T) {
    if let Ok(mut rows) = queue.lock() {
        rows.push_back(value);
    }
}

fn pop<T>(queue: &Mutex<VecDeque<Result<T, StudioError>>>, call: &str) -> Result<T, StudioError> {
    queue
        .lock()
        .ok()
        .and_then(|mut rows| rows.pop_front())
        .unwrap_or_else(|| Err(unscripted(call)))
}

fn record<T: Clone>(rows: &Mutex<Vec<T>>, value: &T) {
    if let Ok(mut rows) = rows.lock() {
        rows.push(value.clone());
    }
}

impl GenerativeService for ScriptedService {
    fn generate_content(
        &self,
        _credential: &Credential,
        call: &ImageEditCall,
    ) -> Result<ContentResponse, StudioError> {
        record(&self.content_calls, call);
        pop(&self.content, "generate_content")
    }

    fn generate_videos(
        &self,
        _credential: &Credential,
        call: &VideoCall,
    ) -> Result<Operation, StudioError> {
        record(&self.video_calls, call);
        pop(&self.submits, "generate_videos")
    }

    fn get_operation(
        &self,
        _credential: &Credential,
        _operation: &Operation,
    ) -> Result<Operation, StudioError> {
        if let Ok(mut count) = self.poll_count.lock() {
            *count += 1;
        }
        pop(&self.polls, "get_operation")
    }

    fn fetch(&self, url: &Url) -> Result<FetchedBody, StudioError> {
        record(&self.fetched, &url.to_string());
        pop(&self.fetches, "fetch")
    }

    fn check_credential(&self, credential: &Credential) -> Result<(), StudioError> {
        if credential.expose() == "rejected-key" {
            return Err(ServiceError::new(
                Some(400),
                Some("INVALID_ARGUMENT"),
                "API key not valid. Please pass a valid API key.",
            )
            .into());
        }
        Ok(())
    }
}
