//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – force model and kernel switches
//! - [`ParametersConfig`] – step size/count, frame cadence, physical constants
//! - [`BoxConfig`]        – simulation box bounds
//! - [`BodyConfig`]       – explicit initial state for each particle, or
//! - [`RandomConfig`]     – a seeded random particle cloud
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! ```yaml
//! engine:
//!   force: "gravity"        # "gravity", "null" or "noise"
//!   collisions: true
//!   parallel: true
//!
//! parameters:
//!   dt: 2.0e-3              # fixed step size
//!   steps: 4000             # number of steps
//!   capture_every: 10       # frame every m steps (0 = never)
//!   G: 1.0                  # gravitational constant
//!   eps: 2.0e-2             # softening length
//!   stability_eps: 1.0e-12  # collision normal guard
//!   damping: 0.99           # wall damping
//!   noise_sigma: 10.0       # thermal-noise std-dev
//!   seed: 0
//!
//! box: { xmin: -100.0, xmax: 100.0, ymin: -100.0, ymax: 100.0 }
//!
//! bodies:
//!   - x: [ -0.5, 0.0 ]
//!     v: [  0.0, 1.0 ]
//!     m: 1.0
//!     radius: 0.02
//! ```
//!
//! Instead of `bodies`, a `random:` section generates the initial state (see
//! [`RandomConfig`]). Exactly one of the two must be present.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::simulation::params::{DEFAULT_DAMPING, DEFAULT_STABILITY_EPS};

/// Which force model drives the particles
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceConfig {
    #[serde(rename = "gravity")] // Softened Newtonian gravity, direct N^2 sum
    Gravity,

    #[serde(rename = "null")] // No force, ballistic motion between wall/collision events
    Null,

    #[serde(rename = "noise")] // Seeded Gaussian acceleration, thermal-noise experiments
    Noise,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub force: ForceConfig, // Force model used for every step
    #[serde(default = "default_true")]
    pub collisions: bool, // `false` skips the collision pass
    #[serde(default = "default_true")]
    pub parallel: bool, // `false` runs the O(N^2) kernels single-threaded
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub dt: f64, // fixed time step
    pub steps: usize, // number of steps to integrate
    #[serde(default)]
    pub capture_every: usize, // frame cadence m, 0 disables frames
    #[serde(rename = "G", default = "default_g")]
    pub g: f64, // gravitational constant
    #[serde(default = "default_eps")]
    pub eps: f64, // softening length
    #[serde(default = "default_stability_eps")]
    pub stability_eps: f64, // collision normal/mass-ratio guard
    #[serde(default = "default_damping")]
    pub damping: f64, // position scale on wall contact
    #[serde(default = "default_noise_sigma")]
    pub noise_sigma: f64, // std-dev of thermal noise acceleration
    #[serde(default)]
    pub seed: u64, // seed for noise and random initial state
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct BoxConfig {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

/// Configuration for a single particle's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: Vec<f64>, // Initial position [x, y]
    pub v: Vec<f64>, // Initial velocity [vx, vy]
    pub m: f64, // Mass
    #[serde(default)]
    pub radius: f64, // Collision radius, 0 = point particle
}

/// Seeded random cloud: Gaussian positions and velocities, uniform masses
#[derive(Deserialize, Debug, Clone)]
pub struct RandomConfig {
    pub n: usize, // number of particles
    pub pos_sigma: f64, // std-dev of positions around the origin
    pub vel_sigma: f64, // std-dev of velocity components
    pub mass_range: [f64; 2], // uniform mass range [lo, hi]
    #[serde(default)]
    pub radius: f64, // common radius
    #[serde(default)]
    pub zero_momentum: bool, // subtract the mass-weighted mean velocity
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(rename = "box")]
    pub bounds: BoxConfig,
    #[serde(default)]
    pub bodies: Option<Vec<BodyConfig>>,
    #[serde(default)]
    pub random: Option<RandomConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn default_true() -> bool {
    true
}

fn default_g() -> f64 {
    1.0
}

fn default_eps() -> f64 {
    2e-2
}

fn default_stability_eps() -> f64 {
    DEFAULT_STABILITY_EPS
}

fn default_damping() -> f64 {
    DEFAULT_DAMPING
}

fn default_noise_sigma() -> f64 {
    10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_fills_defaults() -> Result<()> {
        let cfg = ScenarioConfig::from_yaml_str(
            r#"
engine: { force: "null" }
parameters: { dt: 0.01, steps: 5 }
box: { xmin: -1.0, xmax: 1.0, ymin: -1.0, ymax: 1.0 }
bodies:
  - { x: [0.0, 0.0], v: [1.0, 0.0], m: 1.0 }
"#,
        )?;
        assert_eq!(cfg.engine.force, ForceConfig::Null);
        assert!(cfg.engine.collisions && cfg.engine.parallel);
        assert_eq!(cfg.parameters.stability_eps, 1e-12);
        assert_eq!(cfg.parameters.damping, 0.99);
        assert_eq!(cfg.parameters.capture_every, 0);
        assert!(cfg.random.is_none());
        assert_eq!(cfg.bodies.map(|b| b.len()), Some(1));
        Ok(())
    }

    #[test]
    fn unknown_force_is_a_config_error() {
        let err = ScenarioConfig::from_yaml_str(
            r#"
engine: { force: "magnetism" }
parameters: { dt: 0.01, steps: 5 }
box: { xmin: -1.0, xmax: 1.0, ymin: -1.0, ymax: 1.0 }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }
}
