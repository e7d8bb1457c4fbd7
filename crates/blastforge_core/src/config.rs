//! # Engine Configuration
//!
//! The two levers that bound the cost of a detonation: which directions become
//! rays, and how finely each ray is sampled. A value is passed explicitly into
//! [`crate::ExplosionEngine::new`]; nothing here is global.
//!
//! ## File format
//!
//! ```toml
//! accuracy = "precise"   # or "fast" (default)
//! step_factor = 0.45     # clamped into [0.3, 0.6]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{BlastError, BlastResult};

/// Smallest (finest, slowest) sample step.
pub const MIN_STEP_FACTOR: f32 = 0.3;
/// Largest (coarsest, fastest) sample step.
pub const MAX_STEP_FACTOR: f32 = 0.6;
/// Default sample step.
pub const DEFAULT_STEP_FACTOR: f32 = MIN_STEP_FACTOR;

/// Which offsets in the enumeration cube become rays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    /// Offsets whose truncated distance equals the radius (a rough sphere shell).
    #[default]
    Fast,
    /// Offsets on any face of the cube. Roughly 6x the rays for large radii.
    Precise,
}

/// Immutable tunables for an [`crate::ExplosionEngine`].
///
/// Every deserialization path goes through the same validation as
/// [`EngineConfig::from_toml_str`], including an `EngineConfig` embedded in a
/// host's own config struct.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEngineConfig")]
pub struct EngineConfig {
    accuracy: Accuracy,
    step_factor: f32,
}

/// Unvalidated file form of [`EngineConfig`].
#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawEngineConfig {
    accuracy: Accuracy,
    step_factor: f32,
}

impl Default for RawEngineConfig {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Fast,
            step_factor: DEFAULT_STEP_FACTOR,
        }
    }
}

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = BlastError;

    fn try_from(raw: RawEngineConfig) -> BlastResult<Self> {
        if !raw.step_factor.is_finite() {
            return Err(BlastError::InvalidConfig(format!(
                "step_factor must be finite, got {}",
                raw.step_factor
            )));
        }
        let clamped = raw.step_factor.clamp(MIN_STEP_FACTOR, MAX_STEP_FACTOR);
        if (clamped - raw.step_factor).abs() > f32::EPSILON {
            warn!(
                requested = raw.step_factor,
                clamped, "step_factor out of range, clamping"
            );
        }
        Ok(Self {
            accuracy: raw.accuracy,
            step_factor: clamped,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            accuracy: Accuracy::Fast,
            step_factor: DEFAULT_STEP_FACTOR,
        }
    }
}

impl EngineConfig {
    /// Creates a config, clamping `step_factor` into range.
    ///
    /// A non-finite step factor falls back to the default.
    #[must_use]
    pub fn new(accuracy: Accuracy, step_factor: f32) -> Self {
        Self {
            accuracy,
            step_factor: clamp_step_factor(step_factor),
        }
    }

    /// Default sampling with fast direction selection.
    #[must_use]
    pub fn fast() -> Self {
        Self::default()
    }

    /// Default sampling with precise direction selection.
    #[must_use]
    pub fn precise() -> Self {
        Self::new(Accuracy::Precise, DEFAULT_STEP_FACTOR)
    }

    /// Returns a copy with another step factor (clamped).
    #[must_use]
    pub fn with_step_factor(self, step_factor: f32) -> Self {
        Self::new(self.accuracy, step_factor)
    }

    /// Returns a copy with another accuracy mode.
    #[must_use]
    pub fn with_accuracy(self, accuracy: Accuracy) -> Self {
        Self { accuracy, ..self }
    }

    /// Direction selection mode.
    #[inline]
    #[must_use]
    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Distance a sample point moves per step (before strength scaling).
    #[inline]
    #[must_use]
    pub fn step_factor(&self) -> f32 {
        self.step_factor
    }

    /// Ray budget consumed per step.
    ///
    /// Slightly smaller than the movement at the default factor, so rays reach a
    /// bit further than their nominal length.
    #[inline]
    #[must_use]
    pub fn sample_advance(&self) -> f32 {
        self.step_factor * 1.5 - 0.225
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`BlastError::Parse`] for malformed input or unknown keys and
    /// [`BlastError::InvalidConfig`] for a non-finite step factor.
    pub fn from_toml_str(source: &str) -> BlastResult<Self> {
        let raw: RawEngineConfig = toml::from_str(source)?;
        Self::try_from(raw)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`BlastError::Io`] if the file cannot be read, otherwise as
    /// [`EngineConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> BlastResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

fn clamp_step_factor(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(MIN_STEP_FACTOR, MAX_STEP_FACTOR)
    } else {
        warn!(value, "non-finite step_factor, using default");
        DEFAULT_STEP_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.accuracy(), Accuracy::Fast);
        assert!((config.step_factor() - 0.3).abs() < f32::EPSILON);
        assert!((config.sample_advance() - 0.225).abs() < 1e-6);
    }

    #[test]
    fn test_parse_toml() {
        let config = EngineConfig::from_toml_str("accuracy = \"precise\"\nstep_factor = 0.45\n")
            .expect("valid config");
        assert_eq!(config.accuracy(), Accuracy::Precise);
        assert!((config.step_factor() - 0.45).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = EngineConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let config = EngineConfig::from_toml_str("step_factor = 2.0").expect("clamped");
        assert!((config.step_factor() - MAX_STEP_FACTOR).abs() < f32::EPSILON);

        let config = EngineConfig::new(Accuracy::Fast, 0.01);
        assert!((config.step_factor() - MIN_STEP_FACTOR).abs() < f32::EPSILON);

        let config = EngineConfig::new(Accuracy::Fast, f32::NAN);
        assert!((config.step_factor() - DEFAULT_STEP_FACTOR).abs() < f32::EPSILON);
    }

    #[test]
    fn test_non_finite_step_factor_rejected() {
        let err = EngineConfig::from_toml_str("step_factor = nan").unwrap_err();
        assert!(matches!(err, BlastError::InvalidConfig(_)));
    }

    #[derive(Deserialize)]
    struct HostConfig {
        engine: EngineConfig,
    }

    #[test]
    fn test_embedded_config_is_clamped() {
        let host: HostConfig = toml::from_str("[engine]\nstep_factor = 0.1\n").expect("embedded config");
        assert!((host.engine.step_factor() - MIN_STEP_FACTOR).abs() < f32::EPSILON);
        assert!(host.engine.sample_advance() > 0.0);

        let host: HostConfig = toml::from_str("[engine]\nstep_factor = 9.0\n").expect("embedded config");
        assert!((host.engine.step_factor() - MAX_STEP_FACTOR).abs() < f32::EPSILON);
    }

    #[test]
    fn test_embedded_config_rejects_bad_values() {
        assert!(toml::from_str::<HostConfig>("[engine]\nstep_factor = inf\n").is_err());
        assert!(toml::from_str::<HostConfig>("[engine]\nstride = 0.4\n").is_err());
    }

    #[test]
    fn test_serialized_config_round_trips() {
        let config = EngineConfig::precise().with_step_factor(0.45);
        let text = toml::to_string(&config).expect("serialize");
        assert_eq!(EngineConfig::from_toml_str(&text).expect("parse"), config);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = EngineConfig::from_toml_str("performance = 1").unwrap_err();
        assert!(matches!(err, BlastError::Parse(_)));
    }

    #[test]
    fn test_bad_accuracy_rejected() {
        let err = EngineConfig::from_toml_str("accuracy = \"sloppy\"").unwrap_err();
        assert!(matches!(err, BlastError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here/blast.toml").unwrap_err();
        assert!(matches!(err, BlastError::Io(_)));
    }
}
