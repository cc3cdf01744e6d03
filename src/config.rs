//! Reassembler configuration.
//!
//! The only tunable is the payload ceiling: frames announcing a longer
//! payload are flushed instead of buffered. Configurations can be built in
//! code or loaded from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default payload ceiling, matching the transport receive buffer size.
pub const DEFAULT_MAX_PAYLOAD_LEN: u16 = 270;

/// Errors raised while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The payload ceiling was zero, so every frame with a payload would be
    /// flushed.
    #[error("max_payload_len must be non-zero")]
    ZeroPayloadLimit,
    /// The configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings bounding reassembly resource usage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassemblerConfig {
    /// Largest payload buffered; longer frames are flushed.
    pub max_payload_len: u16,
}

impl ReassemblerConfig {
    /// Build a configuration with the given payload ceiling.
    #[must_use]
    pub const fn new(max_payload_len: u16) -> Self { Self { max_payload_len } }

    /// Check the configuration for values that would make the transport
    /// unusable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroPayloadLimit`] when `max_payload_len` is 0.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_payload_len == 0 {
            return Err(ConfigError::ZeroPayloadLimit);
        }
        Ok(self)
    }

    /// Parse and validate a JSON document. Missing fields take their
    /// defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use hciframe::ReassemblerConfig;
    ///
    /// let config = ReassemblerConfig::from_json(r#"{ "max_payload_len": 64 }"#)
    ///     .expect("valid configuration");
    /// assert_eq!(config.max_payload_len, 64);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::ZeroPayloadLimit`] for a zero ceiling.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()
    }
}

impl Default for ReassemblerConfig {
    fn default() -> Self { Self::new(DEFAULT_MAX_PAYLOAD_LEN) }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ConfigError, DEFAULT_MAX_PAYLOAD_LEN, ReassemblerConfig};

    #[rstest]
    #[case::empty_document("{}", DEFAULT_MAX_PAYLOAD_LEN)]
    #[case::explicit_limit(r#"{"max_payload_len": 1021}"#, 1021)]
    fn loads_json(#[case] document: &str, #[case] expected: u16) {
        let config = ReassemblerConfig::from_json(document).expect("valid document");
        assert_eq!(config.max_payload_len, expected);
    }

    #[test]
    fn rejects_zero_limit() {
        let err = ReassemblerConfig::from_json(r#"{"max_payload_len": 0}"#)
            .expect_err("zero limit must be rejected");
        assert!(matches!(err, ConfigError::ZeroPayloadLimit));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ReassemblerConfig::from_json("{max_payload_len").expect_err("malformed");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
