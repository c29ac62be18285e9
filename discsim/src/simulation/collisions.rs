//! Pairwise elastic disc collisions
//!
//! One pass over all unordered pairs (i < j). A pair overlaps when
//! `|x_i - x_j|^2 < r_i^2 + r_j^2`; overlapping pairs get the 2D elastic
//! impulse along the centre line, tangential components untouched.
//!
//! The pass reads only the pre-pass snapshot of positions and velocities and
//! writes into a separate output buffer:
//! 1. detection + impulse computation runs in parallel over `i`, each task
//!    producing [`Contact`]s from the untouched snapshot
//! 2. contacts are committed serially in ascending `(i, j)` order
//!
//! A particle touching several others in the same step keeps the velocity
//! from the last of its contacts in that order. Deterministic, but not an
//! exact multi-body resolution.

use rayon::prelude::*;

use crate::error::{check_len, Error, Result};
use crate::simulation::params::{positive, DEFAULT_STABILITY_EPS};
use crate::simulation::states::NVec2;

/// A detected overlap with both post-collision velocities already computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub i: usize,
    pub j: usize,
    pub vi: NVec2, // new velocity of i
    pub vj: NVec2, // new velocity of j
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    stability_eps: f64,
    pub parallel: bool,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self {
            stability_eps: DEFAULT_STABILITY_EPS,
            parallel: true,
        }
    }
}

impl CollisionResolver {
    /// Errors: `InvalidParameter` unless `stability_eps` is finite and > 0
    pub fn new(stability_eps: f64) -> Result<Self> {
        positive("stability_eps", stability_eps)?;
        Ok(Self {
            stability_eps,
            parallel: true,
        })
    }

    pub fn serial(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Resolve one collision pass and return the new velocity array.
    /// `v` is never modified; particles without contact keep their velocity.
    ///
    /// Errors: `ShapeMismatch` on unequal lengths, `InvalidParameter` if any mass <= 0
    pub fn resolve(
        &self,
        x: &[NVec2],
        v: &[NVec2],
        m: &[f64],
        radius: &[f64],
    ) -> Result<Vec<NVec2>> {
        let (v_new, _) = self.resolve_counted(x, v, m, radius)?;
        Ok(v_new)
    }

    /// [`CollisionResolver::resolve`] plus the number of contacts found
    pub fn resolve_counted(
        &self,
        x: &[NVec2],
        v: &[NVec2],
        m: &[f64],
        radius: &[f64],
    ) -> Result<(Vec<NVec2>, usize)> {
        let contacts = self.contacts(x, v, m, radius)?;

        let mut v_new = v.to_vec();
        for c in &contacts {
            v_new[c.i] = c.vi;
            v_new[c.j] = c.vj;
        }
        Ok((v_new, contacts.len()))
    }

    /// All overlapping pairs in ascending `(i, j)` order, impulses computed
    /// from the given (pre-pass) velocities
    pub fn contacts(
        &self,
        x: &[NVec2],
        v: &[NVec2],
        m: &[f64],
        radius: &[f64],
    ) -> Result<Vec<Contact>> {
        let n = x.len();
        check_len("velocities", n, v.len())?;
        check_len("masses", n, m.len())?;
        check_len("radii", n, radius.len())?;
        if let Some(i) = m.iter().position(|&mi| mi.is_nan() || mi <= 0.0) {
            return Err(Error::InvalidParameter(format!(
                "mass[{i}] must be > 0, got {}",
                m[i]
            )));
        }

        let scan = |i: usize| {
            ((i + 1)..n).filter_map(move |j| self.collide(i, j, x, v, m, radius))
        };
        // rayon's collect keeps sequential order, so the commit order is (i, j) ascending
        let contacts: Vec<Contact> = if self.parallel {
            (0..n).into_par_iter().flat_map_iter(scan).collect()
        } else {
            (0..n).flat_map(scan).collect()
        };
        Ok(contacts)
    }

    fn collide(
        &self,
        i: usize,
        j: usize,
        x: &[NVec2],
        v: &[NVec2],
        m: &[f64],
        radius: &[f64],
    ) -> Option<Contact> {
        let d = x[i] - x[j];
        let (ri, rj) = (radius[i], radius[j]);
        if d.norm_squared() >= ri * ri + rj * rj {
            return None;
        }

        // stability_eps keeps the normal finite for coincident centres
        let n = d / (d.norm() + self.stability_eps);
        let (mi, mj) = (m[i], m[j]);
        let (vi, vj) = (v[i], v[j]);
        let msum = mi + mj + self.stability_eps;

        let vi_new = vi - (2.0 * mj / msum) * (vi - vj).dot(&n) * n;
        let vj_new = vj - (2.0 * mi / msum) * (vj - vi).dot(&(-n)) * (-n);

        Some(Contact {
            i,
            j,
            vi: vi_new,
            vj: vj_new,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separated_discs_do_not_collide() -> Result<()> {
        let x = vec![NVec2::new(0.0, 0.0), NVec2::new(1.0, 0.0)];
        let v = vec![NVec2::new(1.0, 0.0), NVec2::new(-1.0, 0.0)];
        let out = CollisionResolver::default().resolve(&x, &v, &[1.0, 1.0], &[0.4, 0.4])?;
        assert_eq!(out, v);
        Ok(())
    }

    #[test]
    fn point_particles_never_collide() -> Result<()> {
        let x = vec![NVec2::new(0.0, 0.0); 2];
        let v = vec![NVec2::new(1.0, 0.0), NVec2::new(-1.0, 0.0)];
        let contacts = CollisionResolver::default().contacts(&x, &v, &[1.0, 1.0], &[0.0, 0.0])?;
        assert!(contacts.is_empty());
        Ok(())
    }

    #[test]
    fn coincident_centres_stay_finite() -> Result<()> {
        let x = vec![NVec2::new(2.0, 2.0); 2];
        let v = vec![NVec2::new(1.0, 0.0), NVec2::new(-1.0, 0.0)];
        let out = CollisionResolver::default().resolve(&x, &v, &[1.0, 1.0], &[0.5, 0.5])?;
        assert!(out.iter().all(|u| u.x.is_finite() && u.y.is_finite()));
        Ok(())
    }

    #[test]
    fn non_positive_mass_rejected() {
        let x = vec![NVec2::zeros(); 2];
        let v = vec![NVec2::zeros(); 2];
        let err = CollisionResolver::default()
            .resolve(&x, &v, &[1.0, 0.0], &[0.1, 0.1])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[test]
    fn triple_contact_last_pair_wins() -> Result<()> {
        // 1 overlaps both 0 and 2: pairs (0,1) then (1,2), so v[1] comes from (1,2)
        let x = vec![
            NVec2::new(-0.15, 0.0),
            NVec2::new(0.0, 0.0),
            NVec2::new(0.15, 0.0),
        ];
        let v = vec![
            NVec2::new(1.0, 0.0),
            NVec2::new(0.0, 0.0),
            NVec2::new(-1.0, 0.0),
        ];
        let m = [1.0; 3];
        let r = [0.15; 3];
        let resolver = CollisionResolver::default();
        let contacts = resolver.contacts(&x, &v, &m, &r)?;
        let pairs: Vec<(usize, usize)> = contacts.iter().map(|c| (c.i, c.j)).collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);

        let out = resolver.resolve(&x, &v, &m, &r)?;
        assert_eq!(out[1], contacts[1].vi);
        assert_eq!(out[0], contacts[0].vi);
        assert_eq!(out[2], contacts[1].vj);
        Ok(())
    }

    #[test]
    fn serial_matches_parallel() -> Result<()> {
        let x: Vec<NVec2> = (0..40)
            .map(|i| NVec2::new((i % 8) as f64 * 0.3, (i / 8) as f64 * 0.3))
            .collect();
        let v: Vec<NVec2> = (0..40)
            .map(|i| NVec2::new((i as f64 * 0.7).sin(), (i as f64 * 0.3).cos()))
            .collect();
        let m: Vec<f64> = (0..40).map(|i| 1.0 + (i % 4) as f64).collect();
        let r = vec![0.25; 40];

        let par = CollisionResolver::default().contacts(&x, &v, &m, &r)?;
        let ser = CollisionResolver::default().serial().contacts(&x, &v, &m, &r)?;
        assert!(!par.is_empty());
        assert_eq!(par, ser);
        Ok(())
    }
}
