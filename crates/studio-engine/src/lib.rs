//! Service side of the studio: retrying calls, long-running operation
//! polling and result materialization over a [`GenerativeService`].

pub mod config;
pub mod gemini;
pub mod materialize;
pub mod poller;
pub mod retry;
pub mod service;
pub mod studio;

#[cfg(test)]
mod fakes;

pub use config::StudioConfig;
pub use gemini::GeminiClient;
pub use materialize::GenerationResult;
pub use poller::{OperationPoller, PollEvent, PollPolicy};
pub use retry::{execute_with_retry, RetryNotice, RetryPolicy, Sleeper, ThreadSleeper};
pub use service::GenerativeService;
pub use studio::Studio;
