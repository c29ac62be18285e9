//! Core state types for the particle simulation.
//!
//! `ParticleSystem` stores the state as index-aligned arrays:
//! - `x`      positions (`NVec2`)
//! - `v`      velocities (`NVec2`)
//! - `m`      masses, all > 0
//! - `radius` radii, all >= 0 (0 -> point particle, never collides)
//!
//! plus the current simulation time `t`. The particle count is fixed at
//! construction; bodies are never added, removed or merged.

use nalgebra::Vector2;

use crate::error::{check_len, Error, Result};
use crate::output::FrameSnapshot;

pub type NVec2 = Vector2<f64>;

/// Initial state of one particle, used to build a [`ParticleSystem`]
#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
    pub radius: f64, // collision radius
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    x: Vec<NVec2>,
    v: Vec<NVec2>,
    m: Vec<f64>,
    radius: Vec<f64>,
    t: f64,
}

impl ParticleSystem {
    /// Build a system from index-aligned arrays.
    ///
    /// Errors:
    /// - `ShapeMismatch` if any array length differs from `positions.len()`
    /// - `InvalidParameter` for an empty system, a non-positive mass, a negative
    ///   radius or a non-finite component
    pub fn new(
        positions: Vec<NVec2>,
        velocities: Vec<NVec2>,
        masses: Vec<f64>,
        radii: Vec<f64>,
    ) -> Result<Self> {
        let n = positions.len();
        if n == 0 {
            return Err(Error::InvalidParameter(
                "particle count must be > 0".into(),
            ));
        }
        check_len("velocities", n, velocities.len())?;
        check_len("masses", n, masses.len())?;
        check_len("radii", n, radii.len())?;

        ensure_finite("positions", &positions)?;
        ensure_finite("velocities", &velocities)?;
        for (i, &m) in masses.iter().enumerate() {
            if !m.is_finite() || m <= 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "mass[{i}] must be finite and > 0, got {m}"
                )));
            }
        }
        for (i, &r) in radii.iter().enumerate() {
            if !r.is_finite() || r < 0.0 {
                return Err(Error::InvalidParameter(format!(
                    "radius[{i}] must be finite and >= 0, got {r}"
                )));
            }
        }

        Ok(Self {
            x: positions,
            v: velocities,
            m: masses,
            radius: radii,
            t: 0.0,
        })
    }

    /// Build a system from a list of bodies (same validation as [`ParticleSystem::new`])
    pub fn from_bodies(bodies: &[Body]) -> Result<Self> {
        Self::new(
            bodies.iter().map(|b| b.x).collect(),
            bodies.iter().map(|b| b.v).collect(),
            bodies.iter().map(|b| b.m).collect(),
            bodies.iter().map(|b| b.radius).collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false: a system holds at least one particle
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn positions(&self) -> &[NVec2] {
        &self.x
    }

    pub fn velocities(&self) -> &[NVec2] {
        &self.v
    }

    pub fn masses(&self) -> &[f64] {
        &self.m
    }

    pub fn radii(&self) -> &[f64] {
        &self.radius
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Replace all positions (length and finiteness checked)
    pub fn set_positions(&mut self, positions: Vec<NVec2>) -> Result<()> {
        check_len("positions", self.len(), positions.len())?;
        ensure_finite("positions", &positions)?;
        self.x = positions;
        Ok(())
    }

    /// Replace all velocities (length and finiteness checked)
    pub fn set_velocities(&mut self, velocities: Vec<NVec2>) -> Result<()> {
        check_len("velocities", self.len(), velocities.len())?;
        ensure_finite("velocities", &velocities)?;
        self.v = velocities;
        Ok(())
    }

    /// Total kinetic energy: sum 1/2 m |v|^2
    pub fn kinetic_energy(&self) -> f64 {
        self.v
            .iter()
            .zip(&self.m)
            .map(|(v, m)| 0.5 * m * v.norm_squared())
            .sum()
    }

    /// Total linear momentum: sum m v
    pub fn momentum(&self) -> NVec2 {
        self.v
            .iter()
            .zip(&self.m)
            .fold(NVec2::zeros(), |p, (v, m)| p + *m * v)
    }

    /// Mass-weighted mean position
    pub fn center_of_mass(&self) -> NVec2 {
        let total: f64 = self.m.iter().sum();
        let weighted = self
            .x
            .iter()
            .zip(&self.m)
            .fold(NVec2::zeros(), |acc, (x, m)| acc + *m * x);
        weighted / total
    }

    /// True when every position and velocity component is finite
    pub fn all_finite(&self) -> bool {
        all_finite(&self.x) && all_finite(&self.v)
    }

    /// Defensive copy of the positions, tagged with the current time
    pub fn snapshot(&self, step: usize) -> FrameSnapshot {
        FrameSnapshot {
            positions: self.x.clone(),
            time: Some(self.t),
            step,
        }
    }

    // Integrator access. Length is fixed by construction, so callers only mutate in place.
    pub(crate) fn state_mut(&mut self) -> (&mut [NVec2], &mut [NVec2]) {
        (&mut self.x, &mut self.v)
    }

    pub(crate) fn commit_velocities(&mut self, velocities: Vec<NVec2>) {
        debug_assert_eq!(velocities.len(), self.v.len());
        self.v = velocities;
    }

    pub(crate) fn advance_time(&mut self, dt: f64) {
        self.t += dt;
    }
}

pub(crate) fn all_finite(vs: &[NVec2]) -> bool {
    vs.iter().all(|v| v.x.is_finite() && v.y.is_finite())
}

fn ensure_finite(what: &str, vs: &[NVec2]) -> Result<()> {
    match vs.iter().position(|v| !(v.x.is_finite() && v.y.is_finite())) {
        Some(i) => Err(Error::InvalidParameter(format!(
            "{what}[{i}] must be finite"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> Result<ParticleSystem> {
        ParticleSystem::new(
            vec![NVec2::new(0.0, 0.0), NVec2::new(1.0, 0.0)],
            vec![NVec2::new(3.0, 4.0), NVec2::new(-1.0, 0.0)],
            vec![2.0, 1.0],
            vec![0.1, 0.0],
        )
    }

    #[test]
    fn mismatched_lengths_rejected() {
        let err = ParticleSystem::new(
            vec![NVec2::zeros(); 3],
            vec![NVec2::zeros(); 3],
            vec![1.0; 2],
            vec![0.0; 3],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::ShapeMismatch {
                what: "masses",
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn zero_radius_is_allowed_zero_mass_is_not() {
        assert!(pair().is_ok());
        let err = ParticleSystem::new(
            vec![NVec2::zeros()],
            vec![NVec2::zeros()],
            vec![0.0],
            vec![0.0],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn diagnostics() -> Result<()> {
        let sys = pair()?;
        // 0.5*2*25 + 0.5*1*1
        assert!((sys.kinetic_energy() - 25.5).abs() < 1e-12);
        let p = sys.momentum();
        assert!((p.x - 5.0).abs() < 1e-12 && (p.y - 8.0).abs() < 1e-12);
        let com = sys.center_of_mass();
        assert!((com.x - 1.0 / 3.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn setters_check_shape() -> Result<()> {
        let mut sys = pair()?;
        let err = sys.set_velocities(vec![NVec2::zeros()]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        sys.set_positions(vec![NVec2::new(5.0, 5.0); 2])?;
        assert_eq!(sys.positions()[1], NVec2::new(5.0, 5.0));
        Ok(())
    }

    #[test]
    fn snapshot_is_a_copy() -> Result<()> {
        let mut sys = pair()?;
        let frame = sys.snapshot(0);
        sys.set_positions(vec![NVec2::new(9.0, 9.0); 2])?;
        assert_eq!(frame.positions[0], NVec2::new(0.0, 0.0));
        assert_eq!(frame.time, Some(0.0));
        Ok(())
    }
}
