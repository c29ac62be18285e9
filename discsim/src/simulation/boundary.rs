//! Lossy reflective walls of the axis-aligned simulation box
//!
//! Per axis and independently: a particle outside `[min, max]` has that
//! velocity component negated and that position component scaled by the
//! damping factor. The scaling pulls the particle toward the origin rather
//! than snapping it onto the wall, so particles stay inside a slowly
//! contracting envelope instead of bouncing off a hard elastic wall.

use crate::error::{check_len, Error, Result};
use crate::simulation::params::DEFAULT_DAMPING;
use crate::simulation::states::NVec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryBox {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    damping: f64,
}

impl BoundaryBox {
    /// Box with the default damping (0.99).
    ///
    /// Errors: `InvalidParameter` if `xmin >= xmax`, `ymin >= ymax` or a bound is not finite
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        let bounds = [xmin, xmax, ymin, ymax];
        if !bounds.iter().all(|b| b.is_finite()) {
            return Err(Error::InvalidParameter("box bounds must be finite".into()));
        }
        if xmin >= xmax || ymin >= ymax {
            return Err(Error::InvalidParameter(format!(
                "degenerate box: x [{xmin}, {xmax}], y [{ymin}, {ymax}]"
            )));
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
            damping: DEFAULT_DAMPING,
        })
    }

    /// Symmetric box `[-half, half]^2`
    pub fn square(half: f64) -> Result<Self> {
        Self::new(-half, half, -half, half)
    }

    /// Override the wall damping; must lie in (0, 1]
    pub fn with_damping(mut self, damping: f64) -> Result<Self> {
        if !damping.is_finite() || damping <= 0.0 || damping > 1.0 {
            return Err(Error::InvalidParameter(format!(
                "damping must lie in (0, 1], got {damping}"
            )));
        }
        self.damping = damping;
        Ok(self)
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Apply the wall rule in place and return the number of axis corrections made.
    /// A particle past both an x and a y edge is corrected on both axes (counted twice).
    pub fn apply(&self, x: &mut [NVec2], v: &mut [NVec2]) -> Result<usize> {
        check_len("velocities", x.len(), v.len())?;

        let mut hits = 0;
        for (p, u) in x.iter_mut().zip(v.iter_mut()) {
            if p.x < self.xmin || p.x > self.xmax {
                u.x = -u.x;
                p.x *= self.damping;
                hits += 1;
            }
            if p.y < self.ymin || p.y > self.ymax {
                u.y = -u.y;
                p.y *= self.damping;
                hits += 1;
            }
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_box_rejected() {
        assert!(BoundaryBox::new(1.0, 1.0, 0.0, 1.0).is_err());
        assert!(BoundaryBox::new(0.0, 1.0, 2.0, -2.0).is_err());
        assert!(BoundaryBox::square(10.0).is_ok());
    }

    #[test]
    fn corner_crossing_corrects_both_axes() -> Result<()> {
        let b = BoundaryBox::square(10.0)?;
        let mut x = vec![NVec2::new(11.0, -12.0)];
        let mut v = vec![NVec2::new(2.0, -3.0)];
        let hits = b.apply(&mut x, &mut v)?;
        assert_eq!(hits, 2);
        assert_eq!(v[0], NVec2::new(-2.0, 3.0));
        assert!((x[0].x - 11.0 * 0.99).abs() < 1e-12);
        assert!((x[0].y + 12.0 * 0.99).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn interior_is_untouched() -> Result<()> {
        let b = BoundaryBox::square(1.0)?;
        let mut x = vec![NVec2::new(0.5, -0.5), NVec2::new(1.0, 1.0)];
        let mut v = vec![NVec2::new(1.0, 1.0); 2];
        let before = (x.clone(), v.clone());
        assert_eq!(b.apply(&mut x, &mut v)?, 0);
        assert_eq!((x, v), before);
        Ok(())
    }

    #[test]
    fn damping_is_configurable() -> Result<()> {
        let b = BoundaryBox::square(1.0)?.with_damping(0.5)?;
        let mut x = vec![NVec2::new(2.0, 0.0)];
        let mut v = vec![NVec2::new(1.0, 0.0)];
        b.apply(&mut x, &mut v)?;
        assert_eq!(x[0].x, 1.0);
        assert!(BoundaryBox::square(1.0)?.with_damping(1.5).is_err());
        Ok(())
    }
}
