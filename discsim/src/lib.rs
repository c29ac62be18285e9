pub mod simulation;
pub mod configuration;
pub mod output;
pub mod benchmark;
pub mod error;

pub use error::{Error, Result};

pub use simulation::states::{Body, ParticleSystem, NVec2};
pub use simulation::params::Parameters;
pub use simulation::engine::Engine;
pub use simulation::forces::{Acceleration, AccelSet, NewtonianGravity, NullForce, ThermalNoise};
pub use simulation::boundary::BoundaryBox;
pub use simulation::collisions::{CollisionResolver, Contact};
pub use simulation::integrator::{StepReport, VerletIntegrator};
pub use simulation::scenario::Scenario;
pub use simulation::driver::RunSummary;

pub use configuration::config::{ScenarioConfig, EngineConfig, ParametersConfig, BoxConfig, BodyConfig, RandomConfig, ForceConfig};

pub use output::{FrameSink, FrameSnapshot, RecordingSink, LogSink, ChannelSink};

pub use benchmark::benchmark::{bench_gravity, bench_collisions, bench_verlet};
