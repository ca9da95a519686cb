//! Dendrite quickstart: grow a solid front from the cold wall.
//!
//! Demonstrates:
//!   1. Loading parameters from a YAML file (or using built-in ones)
//!   2. Running the integrator with dumps written on a background thread
//!   3. Draining solver events
//!   4. Restarting from the last dump
//!
//! Run with:
//!   RUST_LOG=info cargo run --example quickstart -- [params.yaml]

use std::env;
use std::error::Error;

use dendrite::io::restore_fields;
use dendrite::prelude::*;
use log::{info, warn};

fn built_in() -> SimConfig {
    let grid = GridSpec::planar(100, 100, 1.0, 1.0).unwrap();
    let params = SimulationParameters {
        epsilon: 0.01,
        tau: 3e-4,
        latent_heat: 1.6,
        alpha: 0.9,
        gamma: 10.0,
        noise_amplitude: 0.01,
        dt: 1e-4,
        steps: 200,
        output_interval: 50,
        t_cool: 0.0,
        t_liquid: 0.0,
    };
    SimConfig::new(grid, params).with_seed(42)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => built_in(),
    };
    let out_dir = env::temp_dir().join("dendrite-quickstart");

    // ─── First run ──────────────────────────────────────────────

    let dumps = DumpSink::new(&out_dir)?;
    let mut sink = BackgroundSink::spawn(dumps, 4)?;
    let mut sim = TimeIntegrator::new(config.clone())?;
    let events = sim.events();

    let summary = sim.run(&mut sink)?;
    let written = sink.finish()?;
    info!("{} steps, {written} dumps in {}", summary.steps, out_dir.display());

    for event in events.try_iter() {
        match event {
            SolverEvent::NonConvergence {
                step,
                equation,
                report,
            } => warn!("step {step}: {equation} solve {report}"),
            SolverEvent::NonFinite { step, field, cell } => {
                warn!("step {step}: non-finite {field} at cell {cell}")
            }
            SolverEvent::OutputDelivered { .. } => {}
        }
    }

    let p = sim.fields().phase();
    let solid = p.iter().filter(|&&v| v > 0.5).count();
    info!(
        "solid fraction {:.3}, last step took {} us",
        solid as f64 / p.len() as f64,
        sim.last_metrics().total_us
    );

    // ─── Restart from the last dump ─────────────────────────────

    let last = config.params.steps.saturating_sub(1);
    let last_output = last - last % config.params.output_interval;
    if config.params.steps > 0 {
        let (state, step) = restore_fields(out_dir.join(format!("step_{last_output:06}.dndr")))?;
        let mut longer = config.clone();
        longer.params.steps += config.params.output_interval;
        let mut resumed = TimeIntegrator::restart(longer, state, step.next().0)?;
        let more = resumed.run(&mut NullSink)?;
        info!("restart from step {step} took {} more steps", more.steps);
    }

    Ok(())
}
