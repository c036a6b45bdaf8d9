//! Simulation settings loaded from JSON.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::orbit::{TRAIL_CAPACITY, TRAIL_CYCLES};
use crate::presets::{DeflectionFault, OrbitFault, PresetContext};
use crate::signal::{Jitter, OrderFilter};

/// User-tunable parameters of a simulation run.
///
/// Every field has a default, so a partial JSON document is enough.
///
/// # Examples
/// ```
/// use odsx::SimulationConfig;
///
/// let config = SimulationConfig::from_json_str(r#"{ "machine_rpm": 2960 }"#)
///     .expect("valid configuration");
/// assert_eq!(config.machine_rpm, 2960.0);
/// assert_eq!(config.animation_rpm, 110.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Visual rotation speed used to animate the model, in RPM.
    pub animation_rpm: f64,
    /// Real machine speed shown in plots and used for speed dependent orders, in RPM.
    pub machine_rpm: f64,
    /// Multiplier applied to every displacement.
    pub global_gain: f64,
    /// Electrical supply frequency in Hz.
    pub line_frequency_hz: f64,
    /// Noise perturbation policy.
    pub jitter: Jitter,
    /// Revolutions kept in the orbit trail.
    pub trail_cycles: f64,
    /// Maximum samples kept in the orbit trail.
    pub trail_capacity: usize,
    /// Order filter applied to the orbit probes.
    pub order_filter: OrderFilter,
    /// Fault applied to the deflection rig at start-up.
    pub deflection_fault: DeflectionFault,
    /// Fault applied to the orbit rig at start-up.
    pub orbit_fault: OrbitFault,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            animation_rpm: 110.0,
            machine_rpm: 1480.0,
            global_gain: 10.0,
            line_frequency_hz: 50.0,
            jitter: Jitter::default(),
            trail_cycles: TRAIL_CYCLES,
            trail_capacity: TRAIL_CAPACITY,
            order_filter: OrderFilter::default(),
            deflection_fault: DeflectionFault::Manual,
            orbit_fault: OrbitFault::Manual,
        }
    }
}

impl SimulationConfig {
    /// Read and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, [`ConfigError::Json`] when
    /// it does not parse and [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] when the document does not parse and
    /// [`ConfigError::Invalid`] when a value is out of range.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value against its physical range.
    ///
    /// Zero speeds are legal; negative or non-finite values are not.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("animation_rpm", self.animation_rpm)?;
        non_negative("machine_rpm", self.machine_rpm)?;
        non_negative("global_gain", self.global_gain)?;
        non_negative("line_frequency_hz", self.line_frequency_hz)?;
        if !(self.trail_cycles.is_finite() && self.trail_cycles > 0.0) {
            return Err(invalid("trail_cycles", "must be a positive number"));
        }
        if self.trail_capacity == 0 {
            return Err(invalid("trail_capacity", "must hold at least one sample"));
        }
        match self.order_filter {
            OrderFilter::None => {}
            OrderFilter::BandPass(order) | OrderFilter::LowPass(order) => {
                if !(order.is_finite() && order > 0.0) {
                    return Err(invalid("order_filter", "order must be a positive number"));
                }
            }
        }
        Ok(())
    }

    /// Machine state handed to the preset library.
    #[must_use]
    pub fn preset_context(&self) -> PresetContext {
        PresetContext {
            machine_rpm: self.machine_rpm,
            line_frequency_hz: self.line_frequency_hz,
        }
    }
}

/// Shorthand for [`ConfigError::Invalid`].
fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

/// Reject NaN and negative values.
fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite, non-negative number"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = SimulationConfig::from_json_str("{}").expect("valid");
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.trail_capacity, 2000);
        assert_eq!(config.jitter, Jitter::Random);
    }

    #[test]
    fn nested_enums_parse() {
        let config = SimulationConfig::from_json_str(
            r#"{
                "jitter": { "seeded": 42 },
                "order_filter": { "band_pass": 1.0 },
                "deflection_fault": "soft-foot",
                "orbit_fault": "oil-whirl"
            }"#,
        )
        .expect("valid");
        assert_eq!(config.jitter, Jitter::Seeded(42));
        assert_eq!(config.order_filter, OrderFilter::BandPass(1.0));
        assert_eq!(config.deflection_fault, DeflectionFault::SoftFoot);
        assert_eq!(config.orbit_fault, OrbitFault::OilWhirl);
    }

    #[test]
    fn negative_speed_is_rejected() {
        let error = SimulationConfig::from_json_str(r#"{ "machine_rpm": -5 }"#)
            .expect_err("negative rpm rejected");
        assert!(matches!(error, ConfigError::Invalid { field: "machine_rpm", .. }));
    }

    #[test]
    fn zero_speed_is_legal() {
        let config = SimulationConfig::from_json_str(r#"{ "animation_rpm": 0, "machine_rpm": 0 }"#)
            .expect("zero rpm is allowed");
        assert_eq!(config.preset_context().machine_rpm, 0.0);
    }

    #[test]
    fn bad_filter_and_trail_are_rejected() {
        let config = SimulationConfig {
            order_filter: OrderFilter::LowPass(-1.0),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "order_filter", .. })
        ));
        let config = SimulationConfig {
            trail_capacity: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = SimulationConfig::from_json_str("{ machine_rpm").expect_err("not json");
        assert!(matches!(error, ConfigError::Json(_)));
    }

    #[test]
    fn loads_from_file() {
        let path = std::env::temp_dir().join(format!("odsx-config-{}.json", std::process::id()));
        let mut file = fs::File::create(&path).expect("create temp file");
        write!(file, r#"{{ "global_gain": 25 }}"#).expect("write temp file");
        drop(file);
        let config = SimulationConfig::from_path(&path).expect("valid file");
        fs::remove_file(&path).expect("remove temp file");
        assert_eq!(config.global_gain, 25.0);

        let missing = SimulationConfig::from_path(path.with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
