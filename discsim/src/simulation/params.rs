//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - fixed step size, step count and frame cadence,
//! - gravitational constant and softening length (`g`, `eps`),
//! - collision stability term and wall damping,
//! - thermal-noise amplitude and random seed

use crate::error::{Error, Result};

pub const DEFAULT_STABILITY_EPS: f64 = 1e-12;
pub const DEFAULT_DAMPING: f64 = 0.99;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // step size
    pub steps: usize, // total number of steps
    pub capture_every: usize, // emit a frame every m steps, 0 = never
    pub g: f64, // gravitational constant
    pub eps: f64, // softening length
    pub stability_eps: f64, // guards the collision normal and mass ratio
    pub damping: f64, // position scale applied on wall contact
    pub noise_sigma: f64, // std-dev of the thermal-noise acceleration
    pub seed: u64, // deterministic seed
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: 2e-3,
            steps: 4000,
            capture_every: 10,
            g: 1.0,
            eps: 2e-2,
            stability_eps: DEFAULT_STABILITY_EPS,
            damping: DEFAULT_DAMPING,
            noise_sigma: 10.0,
            seed: 0,
        }
    }
}

impl Parameters {
    /// Eager validation of everything the step loop relies on.
    /// `eps` is checked by the gravity model itself since other models ignore it.
    pub fn validate(&self) -> Result<()> {
        positive("dt", self.dt)?;
        positive("stability_eps", self.stability_eps)?;
        if !self.g.is_finite() {
            return Err(Error::InvalidParameter("G must be finite".into()));
        }
        if !self.damping.is_finite() || self.damping <= 0.0 || self.damping > 1.0 {
            return Err(Error::InvalidParameter(format!(
                "damping must lie in (0, 1], got {}",
                self.damping
            )));
        }
        if !self.noise_sigma.is_finite() || self.noise_sigma < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "noise_sigma must be finite and >= 0, got {}",
                self.noise_sigma
            )));
        }
        Ok(())
    }
}

/// Fails with `InvalidParameter` unless `value` is finite and > 0
pub(crate) fn positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "{name} must be finite and > 0, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        Parameters::default().validate()
    }

    #[test]
    fn non_positive_dt_rejected() {
        let p = Parameters {
            dt: 0.0,
            ..Parameters::default()
        };
        let msg = p.validate().unwrap_err().to_string();
        assert!(msg.contains("dt"));
    }

    #[test]
    fn non_positive_stability_eps_rejected() {
        let p = Parameters {
            stability_eps: -1e-12,
            ..Parameters::default()
        };
        assert!(p.validate().is_err());
    }
}
