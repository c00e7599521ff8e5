//! # Integration Step Benchmark
//!
//! Benchmarks the real-time path of the gain schedule extension: repeated
//! fixed-step integration with per-step gain prediction.

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{DMatrix, DVector};
use std::path::Path;

use mprim::primitive::phase_index;
use mprim::{
    AnalyticalSolution, FuncApproxError, FunctionApproximator, GainSchedulePrimitive,
    MovementPrimitive, PrimitiveError, Trajectory,
};

/// Base primitive with exponentially decaying phase and linear positions.
#[derive(Clone)]
struct BenchPrimitive {
    dim: usize,
}

impl MovementPrimitive for BenchPrimitive {
    fn dim_orig(&self) -> usize {
        self.dim
    }

    fn integrate_start(&self, x: &mut DVector<f64>, xd: &mut DVector<f64>) {
        x.fill(0.0);
        xd.fill(0.0);
        x[phase_index(self.dim)] = 1.0;
    }

    fn integrate_step(
        &self,
        dt: f64,
        x: &DVector<f64>,
        x_next: &mut DVector<f64>,
        xd_next: &mut DVector<f64>,
    ) {
        let phase_idx = phase_index(self.dim);
        x_next.copy_from(x);
        xd_next.fill(0.0);

        for d in 0..self.dim {
            x_next[d] = x[d] + dt;
            xd_next[d] = 1.0;
        }
        x_next[phase_idx] = x[phase_idx] * (1.0 - dt);
        xd_next[phase_idx] = -x[phase_idx];
    }

    fn analytical_solution(&self, ts: &DVector<f64>) -> AnalyticalSolution {
        let t = ts.len();
        let n = 3 * self.dim + 1;
        AnalyticalSolution {
            xs: DMatrix::zeros(t, n),
            xds: DMatrix::zeros(t, n),
            forcing_terms: DMatrix::zeros(t, self.dim),
            forcing_outputs: DMatrix::zeros(t, self.dim),
        }
    }

    fn states_as_trajectory(
        &self,
        ts: &DVector<f64>,
        xs: &DMatrix<f64>,
        xds: &DMatrix<f64>,
    ) -> Trajectory {
        Trajectory::new(
            ts.clone(),
            xs.columns(0, self.dim).into_owned(),
            xds.columns(0, self.dim).into_owned(),
            DMatrix::zeros(ts.len(), self.dim),
        )
        .unwrap()
    }

    fn train(
        &mut self,
        _trajectory: &Trajectory,
        _save_directory: Option<&Path>,
        _overwrite: bool,
    ) -> Result<(), PrimitiveError> {
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn MovementPrimitive> {
        Box::new(self.clone())
    }
}

/// Approximator predicting `slope * phase`.
#[derive(Clone)]
struct BenchApproximator {
    slope: f64,
}

impl FunctionApproximator for BenchApproximator {
    fn is_trained(&self) -> bool {
        true
    }

    fn predict(
        &self,
        inputs: &DVector<f64>,
        outputs: &mut DVector<f64>,
    ) -> Result<(), FuncApproxError> {
        for i in 0..inputs.len() {
            outputs[i] = self.slope * inputs[i];
        }
        Ok(())
    }

    fn train(
        &mut self,
        _inputs: &DVector<f64>,
        _targets: &DVector<f64>,
        _save_directory: Option<&Path>,
        _overwrite: bool,
    ) -> Result<(), FuncApproxError> {
        Ok(())
    }

    fn retrain(
        &mut self,
        _inputs: &DVector<f64>,
        _targets: &DVector<f64>,
        _save_directory: Option<&Path>,
        _overwrite: bool,
    ) -> Result<(), FuncApproxError> {
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn FunctionApproximator> {
        Box::new(self.clone())
    }
}

fn integrate_step_benchmark(c: &mut Criterion) {
    let dim = 3;
    let schedules = (0..dim)
        .map(|d| {
            Some(Box::new(BenchApproximator {
                slope: d as f64 + 1.0,
            }) as Box<dyn FunctionApproximator>)
        })
        .collect();

    let mut gsp =
        GainSchedulePrimitive::new(Box::new(BenchPrimitive { dim }), schedules).unwrap();

    let state_len = 3 * dim + 1;
    let mut x = DVector::zeros(state_len);
    let mut xd = DVector::zeros(state_len);
    let mut gains = DVector::zeros(dim);
    gsp.integrate_start(&mut x, &mut xd, &mut gains).unwrap();

    let mut x_next = DVector::zeros(state_len);
    let mut xd_next = DVector::zeros(state_len);

    c.bench_function("GainSchedulePrimitive::integrate_step", |b| {
        b.iter(|| {
            gsp.integrate_step(0.001, &x, &mut x_next, &mut xd_next, &mut gains)
                .unwrap();
            x.copy_from(&x_next);
        })
    });
}

criterion_group!(benches, integrate_step_benchmark);
criterion_main!(benches);
