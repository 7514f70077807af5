//! Construction-time configuration.
//!
//! [`SimConfig`] is a `serde`-deserializable description of a simulation run.
//! Every field has a default, so a partial document only overrides what it
//! names:
//!
//! ```json
//! {
//!   "width": 800.0,
//!   "height": 600.0,
//!   "num_particles": 50,
//!   "timestep": 0.02,
//!   "seed": 42,
//!   "collision_policy": "resolve_both_orders",
//!   "mass_min": 1.0,
//!   "mass_max": 30.0,
//!   "radius_min": 5.0,
//!   "radius_max": 20.0
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// How overlapping pairs are visited within one step.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Every ordered pair (i, j), i != j: each unordered pair is resolved twice,
    /// the second time against the state the first resolution produced.
    #[default]
    ResolveBothOrders,
    /// Each unordered pair once, as (i, j) with i < j.
    ResolveOnce,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    pub width: f64, // domain width
    pub height: f64, // domain height
    pub num_particles: usize,
    pub timestep: f64, // nominal seconds per step
    pub seed: Option<u64>, // None -> nondeterministic
    pub collision_policy: CollisionPolicy,
    pub mass_min: f64,
    pub mass_max: f64,
    pub radius_min: f64,
    pub radius_max: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            num_particles: 50,
            timestep: 0.02,
            seed: None,
            collision_policy: CollisionPolicy::ResolveBothOrders,
            mass_min: 1.0,
            mass_max: 30.0,
            radius_min: 5.0,
            radius_max: 20.0,
        }
    }
}

impl SimConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: SimConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and validate a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check extents, timestep and generation ranges.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("timestep", self.timestep),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::InvalidParam(format!("{name} must be finite and > 0")));
            }
        }
        check_range("mass", self.mass_min, self.mass_max)?;
        check_range("radius", self.radius_min, self.radius_max)?;
        Ok(())
    }

    pub fn mass_range(&self) -> RangeInclusive<f64> {
        self.mass_min..=self.mass_max
    }

    pub fn radius_range(&self) -> RangeInclusive<f64> {
        self.radius_min..=self.radius_max
    }
}

fn check_range(name: &str, lo: f64, hi: f64) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() || lo <= 0.0 || lo > hi {
        return Err(Error::InvalidParam(format!(
            "{name} range must satisfy 0 < min <= max, got [{lo}, {hi}]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let cfg = SimConfig::default();
        cfg.validate()?;
        assert_eq!(cfg.num_particles, 50);
        assert_eq!(cfg.collision_policy, CollisionPolicy::ResolveBothOrders);
        Ok(())
    }

    #[test]
    fn partial_json_overrides_defaults() -> Result<()> {
        let cfg = SimConfig::from_json_str(
            r#"{ "num_particles": 8, "seed": 3, "collision_policy": "resolve_once" }"#,
        )?;
        assert_eq!(cfg.num_particles, 8);
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.collision_policy, CollisionPolicy::ResolveOnce);
        assert_eq!(cfg.width, 800.0);
        Ok(())
    }

    #[test]
    fn unknown_field_is_a_config_error() {
        let err = SimConfig::from_json_str(r#"{ "particles": 8 }"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn bad_ranges_rejected() {
        let cfg = SimConfig {
            mass_min: 0.0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("mass"));

        let cfg = SimConfig {
            radius_min: 30.0,
            radius_max: 10.0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().unwrap_err().to_string().contains("radius"));

        let cfg = SimConfig {
            timestep: f64::NAN,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimConfig::from_path("/nonexistent/heatsim.json").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
