//! Drives the steppers by hand through several coupled steps, without the
//! engine, and checks the invariants that must hold at this layer.

use dendrite_core::{Axis, FieldState, GridSpec, SimulationParameters};
use dendrite_linalg::SolverConfig;
use dendrite_solver::{
    apply_boundary_conditions, fill_driving_force, latent_heat_source, HeatStepper,
    PhaseFieldStepper,
};

struct Driver {
    phase: PhaseFieldStepper,
    heat: HeatStepper,
    m: Vec<f64>,
    dpdt: Vec<f64>,
}

impl Driver {
    fn new(n: usize, seed: u64) -> Self {
        Self {
            phase: PhaseFieldStepper::new(seed, SolverConfig::default()),
            heat: HeatStepper::new(SolverConfig::default()),
            m: vec![0.0; n],
            dpdt: vec![0.0; n],
        }
    }

    fn advance(&mut self, state: &mut FieldState, params: &SimulationParameters, step: u64) {
        let grid = *state.grid();
        let bufs = state.buffers_mut();
        apply_boundary_conditions(&grid, Some(&mut *bufs.p), bufs.t, params.t_cool);
        fill_driving_force(bufs.t, params.alpha, params.gamma, &mut self.m);
        let rp = self.phase.step(&grid, params, step, bufs.p, &self.m, bufs.p_next);
        assert!(rp.converged(), "phase: {rp}");
        latent_heat_source(bufs.p, bufs.p_next, params.dt, &mut self.dpdt);
        let rt = self.heat.step(&grid, params, bufs.t, &self.dpdt, bufs.t_next);
        assert!(rt.converged(), "heat: {rt}");
        state.commit();
    }
}

fn run(grid: GridSpec, params: &SimulationParameters, steps: u64) -> Vec<FieldState> {
    let mut state = FieldState::seeded(grid, params.t_liquid);
    let mut driver = Driver::new(grid.cell_count(), 9);
    let mut history = Vec::new();
    for s in 0..steps {
        driver.advance(&mut state, params, s);
        history.push(state.clone());
    }
    history
}

#[test]
fn planar_and_single_layer_volume_agree() {
    let params = SimulationParameters {
        noise_amplitude: 0.1,
        ..Default::default()
    };
    let flat = run(GridSpec::planar(40, 12, 1.0, 0.3).unwrap(), &params, 6);
    let slab = run(GridSpec::volume(40, 12, 1, 1.0, 0.3, 1.0).unwrap(), &params, 6);
    for (a, b) in flat.iter().zip(&slab) {
        for (x, y) in a.phase().iter().zip(b.phase()) {
            assert!((x - y).abs() < 1e-12);
        }
        for (x, y) in a.temperature().iter().zip(b.temperature()) {
            assert!((x - y).abs() < 1e-12);
        }
    }
}

#[test]
fn cold_face_stays_cold_and_front_releases_heat() {
    let params = SimulationParameters::default();
    let grid = GridSpec::planar(40, 8, 1.0, 1.0).unwrap();
    let history = run(grid, &params, 5);
    for state in &history {
        grid.for_each_in_layer(Axis::X, 0, |idx| assert_eq!(state.temperature()[idx], 0.0));
        assert!(state.phase().iter().all(|&p| (-0.5..=1.5).contains(&p)));
    }
    let last = history.last().unwrap();
    assert!(last.temperature().iter().any(|&t| t != 0.0));
}

#[test]
fn steppers_reuse_operators_across_steps() {
    let params = SimulationParameters::default();
    let grid = GridSpec::planar(10, 10, 1.0, 1.0).unwrap();
    let mut state = FieldState::seeded(grid, 0.0);
    let mut driver = Driver::new(grid.cell_count(), 0);
    for s in 0..4 {
        driver.advance(&mut state, &params, s);
    }
    assert_eq!(driver.phase.cache().misses(), 1);
    assert_eq!(driver.phase.cache().hits(), 3);
    assert_eq!(driver.heat.cache().misses(), 1);
    assert_eq!(driver.heat.cache().hits(), 3);
}
