use std::fmt;

use crate::errors::StudioError;

/// API key supplied by the caller for a single request.
///
/// The raw value is only reachable through [`Credential::expose`]; `Debug`
/// and [`Credential::masked`] never print it.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, StudioError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(StudioError::MissingCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `abcd...wxyz` style hint for status lines.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Credential").field(&"<redacted>").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_are_rejected() {
        assert!(matches!(
            Credential::new("   "),
            Err(StudioError::MissingCredential)
        ));
    }

    #[test]
    fn credential_is_trimmed_and_redacted() {
        let credential = Credential::new("  AIzaSyExampleKey1234 ").unwrap();
        assert_eq!(credential.expose(), "AIzaSyExampleKey1234");
        assert_eq!(credential.masked(), "AIza...1234");
        let debug = format!("{credential:?}");
        assert!(!debug.contains("AIza"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn short_credentials_are_fully_masked() {
        let credential = Credential::new("abc").unwrap();
        assert_eq!(credential.masked(), "***");
    }
}
