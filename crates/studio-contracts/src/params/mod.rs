mod aspect;
mod pose;

pub use aspect::AspectRatio;
pub use pose::Pose;

/// Error returned when a UI keyword does not name a known option.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}
