use discsim::{bench_collisions, bench_gravity, bench_verlet};
use discsim::{ChannelSink, FrameSink, LogSink, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use log::info;

use std::path::PathBuf;
use std::thread;

#[derive(Parser, Debug)]
#[command(about = "2D particle simulation: softened gravity, lossy walls, elastic disc collisions")]
struct Args {
    /// Scenario file; bare names are looked up in the crate's `scenarios/` directory
    #[arg(short, long, default_value = "gravity_cloud.yaml")]
    file_name: String,

    /// Override the configured number of steps
    #[arg(long)]
    steps: Option<usize>,

    /// Frames buffered between the simulation and the frame logger
    #[arg(long, default_value_t = 64, value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    frame_buffer: usize,

    /// Run the kernel benchmarks instead of a scenario
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("scenarios")
            .join(file_name)
    };
    ScenarioConfig::from_path(&config_path)
        .with_context(|| format!("failed to load scenario {}", config_path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.bench {
        bench_gravity()?;
        bench_collisions()?;
        bench_verlet()?;
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    if let Some(steps) = args.steps {
        scenario_cfg.parameters.steps = steps;
    }
    let mut scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;

    // Frames leave the step loop through a bounded channel; a slow consumer only loses frames
    let (mut sink, frames) = ChannelSink::bounded(args.frame_buffer);
    let consumer = thread::spawn(move || -> discsim::Result<usize> {
        let mut logger = LogSink;
        let mut received = 0usize;
        for frame in frames {
            logger.capture(frame)?;
            received += 1;
        }
        Ok(received)
    });

    let summary = scenario.run(&mut sink)?;
    drop(sink);
    let received = consumer
        .join()
        .map_err(|_| anyhow::anyhow!("frame consumer thread panicked"))??;

    info!(
        "{} steps, {} frames logged, {} dropped, final KE = {:.6e}",
        summary.steps, received, summary.frames_dropped, summary.kinetic_energy
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_buffer_must_be_positive() {
        assert!(Args::try_parse_from(["discsim", "--frame-buffer", "0"]).is_err());
        let args = Args::try_parse_from(["discsim", "--frame-buffer", "1"]).map(|a| a.frame_buffer);
        assert_eq!(args.ok(), Some(1));
        let default = Args::try_parse_from(["discsim"]).map(|a| a.frame_buffer);
        assert_eq!(default.ok(), Some(64));
    }
}
