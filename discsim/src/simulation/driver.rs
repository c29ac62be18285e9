//! Simulation driver: the fixed-length step loop around a [`Scenario`]
//!
//! Frames are handed to the sink at the end of every `capture_every`-th
//! completed step (step index 0, m, 2m, ...). The sink is a best-effort
//! notification: its errors are logged and counted, never fatal. A numeric
//! abort ends the run before the corrupted state reaches the sink.

use log::{debug, info, warn};

use crate::error::Result;
use crate::output::FrameSink;
use crate::simulation::integrator::StepReport;
use crate::simulation::scenario::Scenario;

/// Totals over one call to [`Scenario::run`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RunSummary {
    pub steps: usize, // steps completed during this run
    pub frames_emitted: usize, // frames accepted by the sink
    pub frames_dropped: usize, // frames the sink rejected
    pub wall_hits: usize,
    pub contacts: usize,
    pub kinetic_energy: f64, // at the end of the run
}

impl Scenario {
    /// Integrate a single step; cadence is left to the caller
    pub fn advance(&mut self) -> Result<StepReport> {
        self.integrator.step(
            &mut self.system,
            &mut self.forces,
            &self.bounds,
            self.collider.as_ref(),
        )
    }

    /// Run the remaining steps, handing a frame to `sink` every
    /// `parameters.capture_every` steps
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> Result<RunSummary> {
        let every = self.parameters.capture_every;
        info!(
            "run: {} particles, {} steps of dt={}, force={:?}, collisions={}, frame every {}",
            self.system.len(),
            self.integrator.steps() - self.integrator.step_index(),
            self.integrator.dt(),
            self.engine.force,
            self.collider.is_some(),
            every
        );

        let mut summary = RunSummary::default();
        while !self.integrator.is_finished() {
            let report = self.advance()?;
            summary.steps += 1;
            summary.wall_hits += report.wall_hits;
            summary.contacts += report.contacts;

            if every > 0 && report.step % every == 0 {
                match sink.capture(self.system.snapshot(report.step)) {
                    Ok(()) => {
                        summary.frames_emitted += 1;
                        debug!(
                            "frame at step {}: wall_hits={} contacts={}",
                            report.step, report.wall_hits, report.contacts
                        );
                    }
                    Err(e) => {
                        summary.frames_dropped += 1;
                        warn!("frame at step {} not delivered: {e}", report.step);
                    }
                }
            }
        }

        summary.kinetic_energy = self.system.kinetic_energy();
        info!(
            "run finished: t={:.6}, {} frames ({} dropped), {} wall hits, {} contacts, KE={:.6e}",
            self.system.time(),
            summary.frames_emitted,
            summary.frames_dropped,
            summary.wall_hits,
            summary.contacts,
            summary.kinetic_energy
        );
        Ok(summary)
    }
}
