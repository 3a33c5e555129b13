//! Session configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use airthings_types::RadonBanding;

use crate::atom::AtomEncoding;
use crate::error::{Error, Result};

const DEFAULT_MAX_ATTEMPTS: u32 = 1;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(250);
const DEFAULT_OVERALL_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for an [`AirthingsSession`](crate::AirthingsSession).
///
/// Durations are written as milliseconds in TOML.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use airthings_core::SessionConfig;
///
/// let config = SessionConfig::default()
///     .elevation(120.0)
///     .max_attempts(3)
///     .command_timeout(Duration::from_secs(2));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Elevation in metres; enables relative to absolute pressure conversion.
    pub elevation: Option<f64>,
    /// When false, radon concentrations are reported in pCi/L.
    pub is_metric: bool,
    /// Whole-update attempts.
    pub max_attempts: u32,
    #[serde(with = "millis")]
    pub retry_delay: Duration,
    /// Wall-clock bound on one attempt.
    #[serde(with = "millis")]
    pub overall_timeout: Duration,
    /// Wait for a command or Atom response.
    #[serde(with = "millis")]
    pub command_timeout: Duration,
    pub radon_banding: RadonBanding,
    pub atom_encoding: AtomEncoding,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            elevation: None,
            is_metric: true,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            overall_timeout: DEFAULT_OVERALL_TIMEOUT,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            radon_banding: RadonBanding::default(),
            atom_encoding: AtomEncoding::default(),
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::invalid_config(e.to_string()))
    }

    /// Load and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid_config(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::invalid_config(e.to_string()))
    }

    /// Reject settings a session cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::invalid_config("max_attempts must be at least 1"));
        }
        if self.overall_timeout.is_zero() {
            return Err(Error::invalid_config("overall_timeout must be non-zero"));
        }
        if self.command_timeout.is_zero() {
            return Err(Error::invalid_config("command_timeout must be non-zero"));
        }
        if let Some(elevation) = self.elevation
            && !elevation.is_finite()
        {
            return Err(Error::invalid_config("elevation must be a finite number"));
        }
        Ok(())
    }

    #[must_use]
    pub fn elevation(mut self, metres: f64) -> Self {
        self.elevation = Some(metres);
        self
    }

    #[must_use]
    pub fn is_metric(mut self, is_metric: bool) -> Self {
        self.is_metric = is_metric;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[must_use]
    pub fn overall_timeout(mut self, timeout: Duration) -> Self {
        self.overall_timeout = timeout;
        self
    }

    #[must_use]
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    #[must_use]
    pub fn radon_banding(mut self, banding: RadonBanding) -> Self {
        self.radon_banding = banding;
        self
    }

    #[must_use]
    pub fn atom_encoding(mut self, encoding: AtomEncoding) -> Self {
        self.atom_encoding = encoding;
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.elevation, None);
        assert!(config.is_metric);
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.retry_delay, Duration::from_millis(250));
        assert_eq!(config.overall_timeout, Duration::from_secs(60));
        assert_eq!(config.command_timeout, Duration::from_secs(5));
        assert_eq!(config.radon_banding, RadonBanding::Current);
        assert_eq!(config.atom_encoding, AtomEncoding::Cbor);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::new()
            .elevation(250.0)
            .is_metric(false)
            .max_attempts(3)
            .retry_delay(Duration::from_millis(10))
            .overall_timeout(Duration::from_secs(20))
            .command_timeout(Duration::from_secs(1))
            .radon_banding(RadonBanding::Legacy)
            .atom_encoding(AtomEncoding::LiteralPrefix);

        assert_eq!(config.elevation, Some(250.0));
        assert!(!config.is_metric);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.command_timeout, Duration::from_secs(1));
        assert_eq!(config.radon_banding, RadonBanding::Legacy);
        assert_eq!(config.atom_encoding, AtomEncoding::LiteralPrefix);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            elevation = 100.0
            is_metric = false
            max_attempts = 2
            command_timeout = 1500
            radon_banding = "legacy"
            atom_encoding = "literal_prefix"
        "#;
        let config = SessionConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.elevation, Some(100.0));
        assert!(!config.is_metric);
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.command_timeout, Duration::from_millis(1500));
        assert_eq!(config.overall_timeout, Duration::from_secs(60));
        assert_eq!(config.radon_banding, RadonBanding::Legacy);
        assert_eq!(config.atom_encoding, AtomEncoding::LiteralPrefix);
    }

    #[test]
    fn test_config_empty_toml_is_default() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn test_config_invalid_toml() {
        let result = SessionConfig::from_toml_str("max_attempts = \"many\"");
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_config_toml_round_trip() {
        let config = SessionConfig::default().max_attempts(4).elevation(12.5);
        let toml = config.to_toml_string().unwrap();
        assert!(toml.contains("retry_delay = 250"));
        assert_eq!(SessionConfig::from_toml_str(&toml).unwrap(), config);
    }

    #[test]
    fn test_config_validation() {
        assert!(matches!(
            SessionConfig::default().max_attempts(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(
            SessionConfig::default()
                .overall_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            SessionConfig::default()
                .command_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(SessionConfig::default().elevation(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = SessionConfig::load("/nonexistent/path/session.toml");
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
