use std::time::Instant;

use crate::error::Result;
use crate::output::RecordingSink;
use crate::simulation::boundary::BoundaryBox;
use crate::simulation::collisions::CollisionResolver;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{Acceleration, NewtonianGravity};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;
use crate::simulation::states::{NVec2, ParticleSystem};

// deterministic positions, no rand needed
fn lissajous_cloud(n: usize, radius: f64) -> Result<ParticleSystem> {
    let x = (0..n)
        .map(|i| {
            let i_f = i as f64;
            NVec2::new((i_f * 0.37).sin() * 5.0, (i_f * 0.13).cos() * 5.0)
        })
        .collect();
    let v = (0..n)
        .map(|i| {
            let i_f = i as f64;
            NVec2::new((i_f * 0.71).cos(), (i_f * 0.29).sin())
        })
        .collect();
    ParticleSystem::new(x, v, vec![1.0; n], vec![radius; n])
}

/// Serial vs rayon gravity kernel
pub fn bench_gravity() -> Result<()> {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    for n in ns {
        let sys = lissajous_cloud(n, 0.01)?;
        let mut out = vec![NVec2::zeros(); n];

        let mut serial = NewtonianGravity::new(0.1, 1e-2)?.serial();
        let mut parallel = NewtonianGravity::new(0.1, 1e-2)?;

        // Warm up
        serial.acceleration(0.0, sys.positions(), sys.masses(), &mut out);
        parallel.acceleration(0.0, sys.positions(), sys.masses(), &mut out);

        let t0 = Instant::now();
        serial.acceleration(0.0, sys.positions(), sys.masses(), &mut out);
        let dt_serial = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        parallel.acceleration(0.0, sys.positions(), sys.masses(), &mut out);
        let dt_parallel = t1.elapsed().as_secs_f64();

        println!(
            "gravity    N = {n:5}, serial = {dt_serial:8.6} s, rayon = {dt_parallel:8.6} s"
        );
    }
    Ok(())
}

/// Serial vs rayon collision scan
pub fn bench_collisions() -> Result<()> {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    for n in ns {
        let sys = lissajous_cloud(n, 0.05)?;
        let serial = CollisionResolver::default().serial();
        let parallel = CollisionResolver::default();

        let args = (sys.positions(), sys.velocities(), sys.masses(), sys.radii());

        let t0 = Instant::now();
        let (_, contacts) = serial.resolve_counted(args.0, args.1, args.2, args.3)?;
        let dt_serial = t0.elapsed().as_secs_f64();

        let t1 = Instant::now();
        parallel.resolve_counted(args.0, args.1, args.2, args.3)?;
        let dt_parallel = t1.elapsed().as_secs_f64();

        println!(
            "collisions N = {n:5}, contacts = {contacts:6}, serial = {dt_serial:8.6} s, rayon = {dt_parallel:8.6} s"
        );
    }
    Ok(())
}

/// Full steps (gravity + walls + collisions) per second
pub fn bench_verlet() -> Result<()> {
    let ns = [200, 400, 800, 1600, 3200];
    let steps = 20;

    for n in ns {
        let parameters = Parameters {
            dt: 1e-3,
            steps,
            capture_every: 0,
            ..Parameters::default()
        };
        let mut scenario = Scenario::new(
            Engine::default(),
            parameters,
            lissajous_cloud(n, 0.01)?,
            BoundaryBox::square(10.0)?,
        )?;

        let t0 = Instant::now();
        scenario.run(&mut RecordingSink::new())?;
        let elapsed = t0.elapsed().as_secs_f64();

        println!(
            "verlet     N = {n:5}, {steps} steps in {elapsed:8.6} s ({:10.1} steps/s)",
            steps as f64 / elapsed
        );
    }
    Ok(())
}
