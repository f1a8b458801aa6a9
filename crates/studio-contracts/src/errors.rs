use std::fmt;

use thiserror::Error;

/// Message surfaced once transient failures outlast the retry budget.
pub const BUSY_MESSAGE: &str =
    "Server is currently busy or daily quota reached. Please try again in a few minutes.";

/// Failure reported by the remote generation service.
///
/// `status` is the HTTP status (or the numeric `error.code` of an operation
/// payload), `code` the symbolic token such as `RESOURCE_EXHAUSTED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: String,
}

impl ServiceError {
    pub fn new(status: Option<u16>, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.code.as_deref()) {
            (Some(status), Some(code)) => write!(f, "{} ({status} {code})", self.message),
            (Some(status), None) => write!(f, "{} ({status})", self.message),
            (None, Some(code)) => write!(f, "{} ({code})", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ServiceError {}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("{0}")]
    MissingInput(&'static str),

    #[error("invalid image asset: {0}")]
    InvalidAsset(String),

    #[error("API key is required")]
    MissingCredential,

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{}", BUSY_MESSAGE)]
    Busy,

    #[error("No image generated.")]
    NoImage,

    #[error("Video generation completed but produced no result.")]
    NoVideoResult,

    #[error("Failed to download video: {0}")]
    Download(String),

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected service response: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl StudioError {
    pub fn service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }

    /// True when the service refused the credential itself; callers should
    /// ask for the key again rather than retry.
    pub fn is_credential_rejected(&self) -> bool {
        let Some(err) = self.service() else {
            return false;
        };
        if matches!(err.status, Some(401 | 403)) {
            return true;
        }
        if matches!(
            err.code.as_deref(),
            Some("UNAUTHENTICATED" | "PERMISSION_DENIED")
        ) {
            return true;
        }
        err.message.contains("API key not valid")
            || err.message.contains("Requested entity was not found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_error_uses_normalized_message() {
        assert_eq!(StudioError::Busy.to_string(), BUSY_MESSAGE);
    }

    #[test]
    fn service_error_display_keeps_original_message() {
        let err = StudioError::from(ServiceError::new(
            Some(400),
            Some("INVALID_ARGUMENT"),
            "Image too large",
        ));
        assert_eq!(err.to_string(), "Image too large (400 INVALID_ARGUMENT)");
        assert_eq!(
            ServiceError::new(None, None, "plain").to_string(),
            "plain"
        );
    }

    #[test]
    fn credential_rejection_is_detected_from_status_and_message() {
        let forbidden = StudioError::from(ServiceError::new(Some(403), None, "nope"));
        assert!(forbidden.is_credential_rejected());

        let invalid = StudioError::from(ServiceError::new(
            Some(400),
            Some("INVALID_ARGUMENT"),
            "API key not valid. Please pass a valid API key.",
        ));
        assert!(invalid.is_credential_rejected());

        let missing_entity = StudioError::from(ServiceError::new(
            Some(404),
            Some("NOT_FOUND"),
            "Requested entity was not found.",
        ));
        assert!(missing_entity.is_credential_rejected());

        let quota = StudioError::from(ServiceError::new(
            Some(429),
            Some("RESOURCE_EXHAUSTED"),
            "Quota exceeded",
        ));
        assert!(!quota.is_credential_rejected());
        assert!(!StudioError::Busy.is_credential_rejected());
    }
}
