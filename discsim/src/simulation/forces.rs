//! Force / acceleration contributors for the particle engine
//!
//! Every force model implements [`Acceleration`]: given positions and masses
//! it adds its contribution into an output buffer. [`AccelSet`] sums the
//! registered terms and owns the shape checks, so the integrator never needs
//! to know which model is active.
//!
//! Models:
//! - [`NewtonianGravity`]: direct O(N^2) gravity with Plummer softening
//! - [`NullForce`]: no force at all
//! - [`ThermalNoise`]: seeded Gaussian kicks, for thermal-noise experiments

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;

use crate::error::{check_len, Error, Result};
use crate::simulation::params::positive;
use crate::simulation::states::NVec2;

/// Trait for acceleration sources.
/// Implementations add their contribution into `out[i]` for each particle;
/// `x`, `m` and `out` are guaranteed to have equal length by [`AccelSet`]
pub trait Acceleration {
    fn acceleration(&mut self, t: f64, x: &[NVec2], m: &[f64], out: &mut [NVec2]);
}

/// Collection of acceleration terms
/// Each term implements [`Acceleration`] and their contributions are summed
/// into a single acceleration vector per particle
#[derive(Default)]
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total accelerations at time `t`
    /// - `out[i]` will be set to the sum of contributions from all terms
    pub fn accumulate_accels(
        &mut self,
        t: f64,
        x: &[NVec2],
        m: &[f64],
        out: &mut [NVec2],
    ) -> Result<()> {
        check_len("masses", x.len(), m.len())?;
        check_len("acceleration buffer", x.len(), out.len())?;

        // Zero buffer
        out.iter_mut().for_each(|a| *a = NVec2::zeros());
        for term in &mut self.terms {
            term.acceleration(t, x, m, out);
        }
        Ok(())
    }

    /// Same as [`AccelSet::accumulate_accels`] but returns a fresh buffer
    pub fn compute(&mut self, t: f64, x: &[NVec2], m: &[f64]) -> Result<Vec<NVec2>> {
        let mut out = vec![NVec2::zeros(); x.len()];
        self.accumulate_accels(t, x, m, &mut out)?;
        Ok(out)
    }
}

/// Newtonian gravity with Plummer softening
///
/// a_i = G * sum_{j != i} m_j (x_j - x_i) / (|x_j - x_i|^2 + eps^2)^{3/2}
#[derive(Debug, Clone)]
pub struct NewtonianGravity {
    g: f64, // gravitational constant
    eps: f64, // softening length
    pub parallel: bool, // one rayon task per particle
}

impl NewtonianGravity {
    /// Errors: `InvalidParameter` if `eps <= 0` or `g` is not finite
    pub fn new(g: f64, eps: f64) -> Result<Self> {
        positive("softening length eps", eps)?;
        if !g.is_finite() {
            return Err(Error::InvalidParameter("G must be finite".into()));
        }
        Ok(Self {
            g,
            eps,
            parallel: true,
        })
    }

    pub fn serial(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Acceleration of particle `i` due to every other particle.
    /// The j == i term is skipped outright instead of relying on r = 0 cancelling.
    fn pull_on(&self, i: usize, x: &[NVec2], m: &[f64]) -> NVec2 {
        let xi = x[i];
        let eps2 = self.eps * self.eps;
        let mut acc = NVec2::zeros();

        for (j, (xj, mj)) in x.iter().zip(m).enumerate() {
            if j == i {
                continue;
            }
            // r points from i to j, so i is pulled along +r
            let r = xj - xi;

            // softened distance: d2 = |r|^2 + eps^2
            let d2 = r.norm_squared() + eps2;
            let inv_r = d2.sqrt().recip();
            let inv_r3 = inv_r * inv_r * inv_r;

            acc += (mj * inv_r3) * r;
        }
        self.g * acc
    }
}

impl Acceleration for NewtonianGravity {
    fn acceleration(&mut self, _t: f64, x: &[NVec2], m: &[f64], out: &mut [NVec2]) {
        let this = &*self;
        // one output slot per task
        if this.parallel {
            out.par_iter_mut()
                .enumerate()
                .for_each(|(i, a)| *a += this.pull_on(i, x, m));
        } else {
            out.iter_mut()
                .enumerate()
                .for_each(|(i, a)| *a += this.pull_on(i, x, m));
        }
    }
}

/// Explicit "no force" model: particles move ballistically between wall and
/// collision events
#[derive(Debug, Clone, Copy, Default)]
pub struct NullForce;

impl Acceleration for NullForce {
    fn acceleration(&mut self, _t: f64, _x: &[NVec2], _m: &[f64], _out: &mut [NVec2]) {}
}

/// Gaussian random acceleration N(0, sigma^2) per component, drawn from a
/// seeded generator so runs are reproducible
#[derive(Debug, Clone)]
pub struct ThermalNoise {
    dist: Normal<f64>,
    rng: StdRng,
}

impl ThermalNoise {
    /// Errors: `InvalidParameter` if `sigma` is negative or not finite
    pub fn new(sigma: f64, seed: u64) -> Result<Self> {
        let dist = Normal::new(0.0, sigma).map_err(|e| {
            Error::InvalidParameter(format!("noise sigma {sigma} rejected: {e}"))
        })?;
        Ok(Self {
            dist,
            rng: StdRng::seed_from_u64(seed),
        })
    }
}

impl Acceleration for ThermalNoise {
    fn acceleration(&mut self, _t: f64, _x: &[NVec2], _m: &[f64], out: &mut [NVec2]) {
        // Fixed draw order: particle by particle, x before y
        for a in out.iter_mut() {
            a.x += self.dist.sample(&mut self.rng);
            a.y += self.dist.sample(&mut self.rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gravity_requires_positive_softening() {
        assert!(matches!(
            NewtonianGravity::new(1.0, 0.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(NewtonianGravity::new(1.0, -1e-3).is_err());
    }

    #[test]
    fn serial_and_parallel_agree() -> Result<()> {
        let x: Vec<NVec2> = (0..37)
            .map(|i| {
                let f = i as f64;
                NVec2::new((f * 0.37).sin() * 5.0, (f * 0.13).cos() * 5.0)
            })
            .collect();
        let m: Vec<f64> = (0..37).map(|i| 1.0 + (i % 3) as f64).collect();

        let mut par = AccelSet::new().with(NewtonianGravity::new(1.0, 1e-2)?);
        let mut ser = AccelSet::new().with(NewtonianGravity::new(1.0, 1e-2)?.serial());
        let a = par.compute(0.0, &x, &m)?;
        let b = ser.compute(0.0, &x, &m)?;
        for (p, s) in a.iter().zip(&b) {
            assert!((p - s).norm() < 1e-12);
        }
        Ok(())
    }

    #[test]
    fn single_particle_feels_nothing() -> Result<()> {
        let mut set = AccelSet::new().with(NewtonianGravity::new(1.0, 1e-3)?);
        let a = set.compute(0.0, &[NVec2::new(1.0, 2.0)], &[5.0])?;
        assert_eq!(a[0], NVec2::zeros());
        Ok(())
    }

    #[test]
    fn noise_is_reproducible_for_a_seed() -> Result<()> {
        let x = vec![NVec2::zeros(); 8];
        let m = vec![1.0; 8];
        let mut a = AccelSet::new().with(ThermalNoise::new(10.0, 7)?);
        let mut b = AccelSet::new().with(ThermalNoise::new(10.0, 7)?);
        assert_eq!(a.compute(0.0, &x, &m)?, b.compute(0.0, &x, &m)?);
        Ok(())
    }

    #[test]
    fn null_force_is_zero() -> Result<()> {
        let mut set = AccelSet::new().with(NullForce);
        let a = set.compute(0.0, &[NVec2::new(1.0, 0.0); 3], &[1.0; 3])?;
        assert!(a.iter().all(|v| *v == NVec2::zeros()));
        Ok(())
    }
}
