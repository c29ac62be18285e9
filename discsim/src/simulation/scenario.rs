//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! [`Scenario`] containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - particle state (`ParticleSystem` at t = 0)
//! - active force set (`AccelSet`)
//! - box walls and collision resolver
//! - the integrator with its step counter
//!
//! Every parameter is validated here, before the first step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::configuration::config::{BodyConfig, ForceConfig, RandomConfig, ScenarioConfig};
use crate::error::{check_len, Error, Result};
use crate::simulation::boundary::BoundaryBox;
use crate::simulation::collisions::CollisionResolver;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{AccelSet, NewtonianGravity, NullForce, ThermalNoise};
use crate::simulation::integrator::VerletIntegrator;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec2, ParticleSystem};

/// Runtime bundle for one simulation run. Owns its particle system exclusively;
/// the state is read through accessors and only the step loop writes it.
pub struct Scenario {
    pub(crate) engine: Engine,
    pub(crate) parameters: Parameters,
    pub(crate) system: ParticleSystem,
    pub(crate) forces: AccelSet,
    pub(crate) bounds: BoundaryBox,
    pub(crate) collider: Option<CollisionResolver>,
    pub(crate) integrator: VerletIntegrator,
}

impl Scenario {
    /// Assemble a scenario from already-built state; the force set is derived
    /// from `engine.force` and `parameters`
    pub fn new(
        engine: Engine,
        parameters: Parameters,
        system: ParticleSystem,
        bounds: BoundaryBox,
    ) -> Result<Self> {
        let forces = build_forces(&engine, &parameters)?;
        Self::with_forces(engine, parameters, system, bounds, forces)
    }

    /// Like [`Scenario::new`] but with a caller-supplied force set.
    /// The initial acceleration is evaluated here, so a non-finite one fails
    /// with `NumericOverflow` before any step.
    pub fn with_forces(
        engine: Engine,
        parameters: Parameters,
        system: ParticleSystem,
        bounds: BoundaryBox,
        mut forces: AccelSet,
    ) -> Result<Self> {
        parameters.validate()?;
        let bounds = bounds.with_damping(parameters.damping)?;
        let collider = if engine.collisions {
            let mut resolver = CollisionResolver::new(parameters.stability_eps)?;
            resolver.parallel = engine.parallel;
            Some(resolver)
        } else {
            None
        };
        let mut integrator = VerletIntegrator::new(parameters.dt, parameters.steps)?;
        integrator.bootstrap(&system, &mut forces)?;

        Ok(Self {
            engine,
            parameters,
            system,
            forces,
            bounds,
            collider,
            integrator,
        })
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn bounds(&self) -> &BoundaryBox {
        &self.bounds
    }

    /// `None` when the engine runs without the collision pass
    pub fn collider(&self) -> Option<&CollisionResolver> {
        self.collider.as_ref()
    }

    pub fn integrator(&self) -> &VerletIntegrator {
        &self.integrator
    }

    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        // Engine (runtime) from EngineConfig
        let engine = Engine {
            force: cfg.engine.force,
            collisions: cfg.engine.collisions,
            parallel: cfg.engine.parallel,
        };

        // Parameters (runtime) from ParametersConfig
        let p_cfg = cfg.parameters;
        let parameters = Parameters {
            dt: p_cfg.dt,
            steps: p_cfg.steps,
            capture_every: p_cfg.capture_every,
            g: p_cfg.g,
            eps: p_cfg.eps,
            stability_eps: p_cfg.stability_eps,
            damping: p_cfg.damping,
            noise_sigma: p_cfg.noise_sigma,
            seed: p_cfg.seed,
        };

        let b = cfg.bounds;
        let bounds = BoundaryBox::new(b.xmin, b.xmax, b.ymin, b.ymax)?;

        // Particles: explicit list or seeded random cloud, never both
        let bodies = match (cfg.bodies, cfg.random) {
            (Some(list), None) => bodies_from_config(&list)?,
            (None, Some(random)) => random_bodies(&random, parameters.seed)?,
            (Some(_), Some(_)) => {
                return Err(Error::InvalidParameter(
                    "give either `bodies` or `random`, not both".into(),
                ))
            }
            (None, None) => {
                return Err(Error::InvalidParameter(
                    "scenario needs `bodies` or `random`".into(),
                ))
            }
        };
        let system = ParticleSystem::from_bodies(&bodies)?;

        Self::new(engine, parameters, system, bounds)
    }
}

/// Force set for the configured model. Only gravity validates `eps`.
pub fn build_forces(engine: &Engine, parameters: &Parameters) -> Result<AccelSet> {
    let forces = match engine.force {
        ForceConfig::Gravity => {
            let mut gravity = NewtonianGravity::new(parameters.g, parameters.eps)?;
            gravity.parallel = engine.parallel;
            AccelSet::new().with(gravity)
        }
        ForceConfig::Null => AccelSet::new().with(NullForce),
        ForceConfig::Noise => {
            AccelSet::new().with(ThermalNoise::new(parameters.noise_sigma, parameters.seed)?)
        }
    };
    Ok(forces)
}

fn bodies_from_config(list: &[BodyConfig]) -> Result<Vec<Body>> {
    list.iter()
        .map(|bc| -> Result<Body> {
            check_len("body position", 2, bc.x.len())?;
            check_len("body velocity", 2, bc.v.len())?;
            Ok(Body {
                x: NVec2::new(bc.x[0], bc.x[1]),
                v: NVec2::new(bc.v[0], bc.v[1]),
                m: bc.m,
                radius: bc.radius,
            })
        })
        .collect()
}

/// Gaussian cloud around the origin. With `zero_momentum` the mass-weighted
/// mean velocity is removed so the cloud does not drift as a whole.
pub fn random_bodies(cfg: &RandomConfig, seed: u64) -> Result<Vec<Body>> {
    if cfg.n == 0 {
        return Err(Error::InvalidParameter("random.n must be > 0".into()));
    }
    let [m_lo, m_hi] = cfg.mass_range;
    if !(m_lo > 0.0 && m_hi >= m_lo && m_hi.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "random.mass_range must satisfy 0 < lo <= hi, got [{m_lo}, {m_hi}]"
        )));
    }
    let pos = normal("random.pos_sigma", cfg.pos_sigma)?;
    let vel = normal("random.vel_sigma", cfg.vel_sigma)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut bodies: Vec<Body> = (0..cfg.n)
        .map(|_| {
            let m = if m_hi > m_lo {
                rng.random_range(m_lo..m_hi)
            } else {
                m_lo
            };
            Body {
                x: NVec2::new(pos.sample(&mut rng), pos.sample(&mut rng)),
                v: NVec2::new(vel.sample(&mut rng), vel.sample(&mut rng)),
                m,
                radius: cfg.radius,
            }
        })
        .collect();

    if cfg.zero_momentum {
        let total_m: f64 = bodies.iter().map(|b| b.m).sum();
        let drift = bodies
            .iter()
            .fold(NVec2::zeros(), |p, b| p + b.m * b.v)
            / total_m;
        bodies.iter_mut().for_each(|b| b.v -= drift);
    }
    Ok(bodies)
}

fn normal(name: &str, sigma: f64) -> Result<Normal<f64>> {
    Normal::new(0.0, sigma)
        .map_err(|e| Error::InvalidParameter(format!("{name} = {sigma} rejected: {e}")))
}
