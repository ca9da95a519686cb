//! Benchmark profiles for the Dendrite phase-field solver.
//!
//! - [`reference_profile`]: 200×200 planar grid (40K cells), the
//!   production parameter set with noise enabled
//! - [`stress_profile`]: 500×500 planar grid (250K cells)
//! - [`volume_profile`]: 40×40×40 volume (64K cells)

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use dendrite_core::{GridSpec, SimulationParameters};
use dendrite_engine::SimConfig;

/// Physical parameters shared by every profile.
///
/// `dt = 1e-4` with `ε = 0.01` on a unit domain keeps the phase operator
/// well conditioned at these resolutions.
pub fn production_parameters(steps: u64) -> SimulationParameters {
    SimulationParameters {
        epsilon: 0.01,
        tau: 3e-4,
        latent_heat: 1.6,
        alpha: 0.9,
        gamma: 10.0,
        noise_amplitude: 0.01,
        dt: 1e-4,
        steps,
        output_interval: steps.max(1),
        t_cool: 0.0,
        t_liquid: 0.0,
    }
}

/// 200×200 cells on the unit square.
pub fn reference_profile(seed: u64, steps: u64) -> SimConfig {
    planar(200, seed, steps)
}

/// 500×500 cells on the unit square.
pub fn stress_profile(seed: u64, steps: u64) -> SimConfig {
    planar(500, seed, steps)
}

/// 40×40×40 cells on the unit cube.
pub fn volume_profile(seed: u64, steps: u64) -> SimConfig {
    let grid = GridSpec::volume(40, 40, 40, 1.0, 1.0, 1.0).expect("valid profile grid");
    SimConfig::new(grid, production_parameters(steps)).with_seed(seed)
}

fn planar(n: usize, seed: u64, steps: u64) -> SimConfig {
    let grid = GridSpec::planar(n, n, 1.0, 1.0).expect("valid profile grid");
    SimConfig::new(grid, production_parameters(steps)).with_seed(seed)
}
