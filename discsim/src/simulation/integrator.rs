//! Fixed-step velocity-Verlet integrator
//!
//! One step, with `a` cached from the previous step:
//! 1. drift:   x <- x + v dt + 1/2 a dt^2
//! 2. a_new from the drifted positions
//! 3. kick:    v <- v + 1/2 (a + a_new) dt
//! 4. a <- a_new
//! 5. wall rule, then one collision pass on the post-kick state
//!
//! `a_new` is always evaluated from the same positions that the kick uses,
//! never from a stale or later array. The first step bootstraps `a` from the
//! initial state. Non-finite state after the force pass or the collision
//! pass aborts with `NumericOverflow`.

use log::trace;

use crate::error::{check_len, Error, Result};
use crate::simulation::boundary::BoundaryBox;
use crate::simulation::collisions::CollisionResolver;
use crate::simulation::forces::AccelSet;
use crate::simulation::params::positive;
use crate::simulation::states::{all_finite, NVec2, ParticleSystem};

/// What happened during one completed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub step: usize, // index of the completed step, starting at 0
    pub wall_hits: usize, // axis corrections made by the wall rule
    pub contacts: usize, // colliding pairs resolved
}

/// Step counter plus cached acceleration; terminal once `step == steps`
#[derive(Debug, Clone)]
pub struct VerletIntegrator {
    dt: f64,
    steps: usize,
    step: usize,
    a: Option<Vec<NVec2>>, // a_n, None until bootstrapped
}

impl VerletIntegrator {
    /// Errors: `InvalidParameter` unless `dt` is finite and > 0
    pub fn new(dt: f64, steps: usize) -> Result<Self> {
        positive("dt", dt)?;
        Ok(Self {
            dt,
            steps,
            step: 0,
            a: None,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Number of steps completed so far
    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.steps
    }

    /// Evaluate the initial acceleration from the current state.
    /// The first [`VerletIntegrator::step`] does this itself if it was never called.
    pub fn bootstrap(&mut self, sys: &ParticleSystem, forces: &mut AccelSet) -> Result<()> {
        self.a = Some(self.initial_acceleration(sys, forces)?);
        Ok(())
    }

    fn initial_acceleration(
        &self,
        sys: &ParticleSystem,
        forces: &mut AccelSet,
    ) -> Result<Vec<NVec2>> {
        let a = forces.compute(sys.time(), sys.positions(), sys.masses())?;
        if !all_finite(&a) {
            return Err(Error::NumericOverflow {
                step: self.step,
                what: "initial acceleration",
            });
        }
        Ok(a)
    }

    /// Advance `sys` by one step.
    ///
    /// Errors:
    /// - `InvalidParameter` once all configured steps are done
    /// - `ShapeMismatch` if `sys` no longer has the particle count the cached acceleration was built for
    /// - `NumericOverflow` if acceleration, positions or velocities turn non-finite
    pub fn step(
        &mut self,
        sys: &mut ParticleSystem,
        forces: &mut AccelSet,
        bounds: &BoundaryBox,
        collider: Option<&CollisionResolver>,
    ) -> Result<StepReport> {
        if self.is_finished() {
            return Err(Error::InvalidParameter(format!(
                "all {} steps already integrated",
                self.steps
            )));
        }
        if let Some(a) = &self.a {
            check_len("cached acceleration", sys.len(), a.len())?;
        }
        let a = match self.a.take() {
            Some(a) => a,
            None => self.initial_acceleration(sys, forces)?,
        };

        let step = self.step;
        let dt = self.dt;
        let half_dt2 = 0.5 * dt * dt;
        let t_new = sys.time() + dt;

        // Drift: x_n+1 = x_n + dt v_n + dt^2/2 a_n
        {
            let (x, v) = sys.state_mut();
            for ((xi, vi), ai) in x.iter_mut().zip(v.iter()).zip(&a) {
                *xi += dt * vi + half_dt2 * ai;
            }
        }

        // a_n+1 from x_n+1
        let a_new = forces.compute(t_new, sys.positions(), sys.masses())?;
        if !all_finite(&a_new) {
            return Err(Error::NumericOverflow {
                step,
                what: "acceleration",
            });
        }

        // Kick: v_n+1 = v_n + dt/2 (a_n + a_n+1)
        let wall_hits = {
            let (x, v) = sys.state_mut();
            for ((vi, ai), ai_new) in v.iter_mut().zip(&a).zip(&a_new) {
                *vi += (0.5 * dt) * (ai + ai_new);
            }
            bounds.apply(x, v)?
        };
        self.a = Some(a_new);

        let contacts = match collider {
            Some(resolver) => {
                let (v_new, contacts) = resolver.resolve_counted(
                    sys.positions(),
                    sys.velocities(),
                    sys.masses(),
                    sys.radii(),
                )?;
                sys.commit_velocities(v_new);
                contacts
            }
            None => 0,
        };

        if !sys.all_finite() {
            return Err(Error::NumericOverflow {
                step,
                what: "particle state",
            });
        }

        sys.advance_time(dt);
        self.step += 1;

        trace!("step {step}: t={t_new:.6} wall_hits={wall_hits} contacts={contacts}");
        Ok(StepReport {
            step,
            wall_hits,
            contacts,
        })
    }
}
