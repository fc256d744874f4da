//! Configuration for split detection and execution.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default minimum confidence a heuristic split point needs before the
/// document is actually split.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

/// Environment variable overriding [`SplitterConfig::min_confidence`].
pub const ENV_MIN_CONFIDENCE: &str = "SPLIT_CONFIDENCE_THRESHOLD";
/// Environment variable overriding [`SplitterConfig::ocr_enabled`].
pub const ENV_OCR_ENABLED: &str = "SPLIT_OCR_ENABLED";
/// Environment variable overriding [`SplitterConfig::ocr_dpi`].
pub const ENV_OCR_DPI: &str = "SPLIT_OCR_DPI";
/// Environment variable overriding [`SplitterConfig::ocr_timeout_secs`].
pub const ENV_OCR_TIMEOUT: &str = "SPLIT_OCR_TIMEOUT_SECS";

/// Splitter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Minimum confidence for acting on a detected split point.
    pub min_confidence: f64,

    /// Native text with fewer non-whitespace characters than this falls back to OCR.
    pub min_native_text_chars: usize,

    /// Enable OCR fallback.
    pub ocr_enabled: bool,

    /// Rasterization resolution for OCR.
    pub ocr_dpi: u32,

    /// Hard timeout for each external OCR process, in seconds.
    pub ocr_timeout_secs: u64,

    /// Run the three heuristic detectors on separate threads.
    pub parallel_detectors: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SplitterConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            min_native_text_chars: 50,
            ocr_enabled: true,
            ocr_dpi: 300,
            ocr_timeout_secs: 60,
            parallel_detectors: false,
        }
    }

    /// Set the minimum split confidence.
    pub fn with_min_confidence(mut self, threshold: f64) -> Self {
        self.min_confidence = threshold;
        self
    }

    /// Set the native-text length below which OCR is attempted.
    pub fn with_min_native_text_chars(mut self, chars: usize) -> Self {
        self.min_native_text_chars = chars;
        self
    }

    /// Enable OCR fallback.
    pub fn with_ocr(mut self, enable: bool) -> Self {
        self.ocr_enabled = enable;
        self
    }

    /// Set the OCR rasterization resolution.
    pub fn with_ocr_dpi(mut self, dpi: u32) -> Self {
        self.ocr_dpi = dpi;
        self
    }

    /// Set the per-process OCR timeout.
    pub fn with_ocr_timeout(mut self, timeout: Duration) -> Self {
        self.ocr_timeout_secs = timeout.as_secs();
        self
    }

    /// Run heuristic detectors concurrently.
    pub fn with_parallel_detectors(mut self, enable: bool) -> Self {
        self.parallel_detectors = enable;
        self
    }

    /// Per-process OCR timeout as a [`Duration`].
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_secs)
    }

    /// Load configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by the `SPLIT_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new().apply_env()
    }

    /// Apply `SPLIT_*` environment overrides on top of this configuration.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MIN_CONFIDENCE) {
            self.min_confidence = parse_value(ENV_MIN_CONFIDENCE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_OCR_ENABLED) {
            self.ocr_enabled = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::InvalidConfig(format!(
                        "{}: expected a boolean, found '{}'",
                        ENV_OCR_ENABLED, other
                    )))
                },
            };
        }
        if let Some(raw) = lookup(ENV_OCR_DPI) {
            self.ocr_dpi = parse_value(ENV_OCR_DPI, &raw)?;
        }
        if let Some(raw) = lookup(ENV_OCR_TIMEOUT) {
            self.ocr_timeout_secs = parse_value(ENV_OCR_TIMEOUT, &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the splitter cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !self.min_confidence.is_finite() || self.min_confidence < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_confidence must be a non-negative number, found {}",
                self.min_confidence
            )));
        }
        if self.ocr_dpi == 0 {
            return Err(Error::InvalidConfig("ocr_dpi must be positive".to_string()));
        }
        if self.ocr_timeout_secs == 0 {
            return Err(Error::InvalidConfig("ocr_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{}: cannot parse '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SplitterConfig::default();
        assert_eq!(config.min_confidence, 0.7);
        assert_eq!(config.min_native_text_chars, 50);
        assert!(config.ocr_enabled);
        assert_eq!(config.ocr_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = SplitterConfig::new()
            .with_min_confidence(0.5)
            .with_ocr(false)
            .with_ocr_dpi(400)
            .with_parallel_detectors(true);
        assert_eq!(config.min_confidence, 0.5);
        assert!(!config.ocr_enabled);
        assert_eq!(config.ocr_dpi, 400);
        assert!(config.parallel_detectors);
    }

    #[test]
    fn test_env_overrides() {
        let config = SplitterConfig::new()
            .apply_overrides(lookup_from(&[
                (ENV_MIN_CONFIDENCE, "0.55"),
                (ENV_OCR_ENABLED, "false"),
                (ENV_OCR_DPI, "200"),
            ]))
            .unwrap();
        assert_eq!(config.min_confidence, 0.55);
        assert!(!config.ocr_enabled);
        assert_eq!(config.ocr_dpi, 200);
        assert_eq!(config.ocr_timeout_secs, 60);
    }

    #[test]
    fn test_env_rejects_garbage() {
        let err = SplitterConfig::new()
            .apply_overrides(lookup_from(&[(ENV_MIN_CONFIDENCE, "high")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = SplitterConfig::new()
            .apply_overrides(lookup_from(&[(ENV_OCR_ENABLED, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SplitterConfig::new()
            .with_min_confidence(f64::NAN)
            .validate()
            .is_err());
        assert!(SplitterConfig::new()
            .with_min_confidence(-0.1)
            .validate()
            .is_err());
        assert!(SplitterConfig::new().with_ocr_dpi(0).validate().is_err());
    }

    #[test]
    fn test_json_file_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("split.json");
        std::fs::write(&path, r#"{ "min_confidence": 0.6, "ocr_enabled": false }"#).unwrap();

        let config = SplitterConfig::from_json_file(&path).unwrap();
        assert_eq!(config.min_confidence, 0.6);
        assert!(!config.ocr_enabled);
        assert_eq!(config.ocr_dpi, 300);
    }
}
