//! # Gain schedule extension
//!
//! This module extends a base movement primitive with a bank of per-dimension
//! function approximators which predict auxiliary scalar signals (typically
//! control gains) from the primitive's phase. The extension delegates the
//! trajectory dynamics to the base primitive and layers the gain computation
//! on top, so every integration step also produces one gain value per
//! dimension.
//!
//! The per-step path is real-time critical: once the scratch buffers have
//! reached their working size, [`GainSchedulePrimitive::integrate_step`] runs
//! without heap allocation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use nalgebra::{DMatrix, DVector};
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::func_approx::{FuncApproxError, FunctionApproximator};
use crate::primitive::{
    phase_column, phase_of_state, AnalyticalSolution, MovementPrimitive, PrimitiveError,
};
use crate::trajectory::{Trajectory, TrajectoryError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A movement primitive with an attached bank of gain schedules.
///
/// The bank holds one approximator slot per original dimension of the base
/// primitive. A slot may be absent, in which case its gain output is zero. An
/// entirely empty bank disables gain computation altogether.
pub struct GainSchedulePrimitive {
    /// The base primitive providing the trajectory dynamics
    base: Box<dyn MovementPrimitive>,

    /// One approximator slot per dimension, or empty if gains are disabled
    schedules: Vec<Option<Box<dyn FunctionApproximator>>>,

    /// Scratch phase input for single-sample prediction, length 1
    phase_one: DVector<f64>,

    /// Scratch prediction output for single-sample prediction, length 1
    pred_one: DVector<f64>,

    /// Scratch prediction output for batch prediction, resized only when the
    /// batch size changes
    pred_batch: DVector<f64>,

    /// Scratch gain matrix for the per-step path, `1 x n_gain_schedules`
    gains_one: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur in the gain schedule extension.
#[derive(Debug, Error)]
pub enum GainScheduleError {
    /// The bank must either be empty or have one slot per dimension.
    #[error("A bank of {found} gain schedules does not match the primitive dimensionality {expected}")]
    BankDimMismatch { expected: usize, found: usize },

    /// Training gain schedules with an empty bank is a caller error.
    #[error("Cannot train gain schedules: no approximators are configured")]
    EmptyBank,

    /// The trajectory carries no misc channel to provide training targets.
    #[error("Trajectory has no misc channel to provide gain training targets")]
    MissingTargets,

    /// The misc channel must have one target column per configured slot.
    #[error("Trajectory misc channel has {found} columns but {expected} gain schedules are configured")]
    TargetDimMismatch { expected: usize, found: usize },

    #[error("Function approximator error: {0}")]
    FuncApprox(#[from] FuncApproxError),

    #[error("Movement primitive error: {0}")]
    Primitive(#[from] PrimitiveError),

    #[error("Trajectory error: {0}")]
    Trajectory(#[from] TrajectoryError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GainSchedulePrimitive {
    /// Create a new gain scheduled primitive.
    ///
    /// Takes ownership of the base primitive and of each supplied approximator
    /// slot. The bank must either be empty (gains disabled) or have exactly
    /// one slot per original dimension of the base primitive.
    pub fn new(
        base: Box<dyn MovementPrimitive>,
        schedules: Vec<Option<Box<dyn FunctionApproximator>>>,
    ) -> Result<Self, GainScheduleError> {
        if !schedules.is_empty() && schedules.len() != base.dim_orig() {
            return Err(GainScheduleError::BankDimMismatch {
                expected: base.dim_orig(),
                found: schedules.len(),
            });
        }

        // Pre-allocate scratch buffers for real-time execution
        let n = schedules.len();
        Ok(Self {
            base,
            schedules,
            phase_one: DVector::zeros(1),
            pred_one: DVector::zeros(1),
            pred_batch: DVector::zeros(0),
            gains_one: DMatrix::zeros(1, n),
        })
    }

    /// The number of gain schedule slots (0 if gains are disabled).
    pub fn n_gain_schedules(&self) -> usize {
        self.schedules.len()
    }

    /// The original dimensionality of the base primitive.
    pub fn dim_orig(&self) -> usize {
        self.base.dim_orig()
    }

    /// Compute the gain outputs for a column of phase samples.
    ///
    /// `out` is resized to `T x n_gain_schedules` and zero filled. For each
    /// slot which is present and trained the predicted output is written into
    /// the corresponding column; absent or untrained slots leave their column
    /// at zero.
    pub fn compute_gain_outputs(
        &mut self,
        phases: &DVector<f64>,
        out: &mut DMatrix<f64>,
    ) -> Result<(), GainScheduleError> {
        let t = phases.len();

        if t == 1 {
            predict_gains(&self.schedules, phases, &mut self.pred_one, out)
        } else {
            // Batch prediction reuses its own scratch buffer, resized only
            // when the batch size changes
            if self.pred_batch.len() != t {
                self.pred_batch = DVector::zeros(t);
            }
            predict_gains(&self.schedules, phases, &mut self.pred_batch, out)
        }
    }

    /// Produce the initial state, state derivative and gains.
    ///
    /// `gains` must have length `n_gain_schedules` and is overwritten in
    /// place.
    pub fn integrate_start(
        &mut self,
        x: &mut DVector<f64>,
        xd: &mut DVector<f64>,
        gains: &mut DVector<f64>,
    ) -> Result<(), GainScheduleError> {
        self.base.integrate_start(x, xd);

        self.phase_one[0] = phase_of_state(x, self.base.dim_orig());
        predict_gains(
            &self.schedules,
            &self.phase_one,
            &mut self.pred_one,
            &mut self.gains_one,
        )?;
        gains.tr_copy_from(&self.gains_one);

        Ok(())
    }

    /// Integrate one fixed step and compute the gains for the updated state.
    ///
    /// The gains are computed from the phase of the *updated* state, so they
    /// lag the dynamics integration within the same call. This path runs on
    /// every control tick and performs no heap allocation once the scratch
    /// buffers have stabilised.
    pub fn integrate_step(
        &mut self,
        dt: f64,
        x: &DVector<f64>,
        x_next: &mut DVector<f64>,
        xd_next: &mut DVector<f64>,
        gains: &mut DVector<f64>,
    ) -> Result<(), GainScheduleError> {
        self.base.integrate_step(dt, x, x_next, xd_next);

        self.phase_one[0] = phase_of_state(x_next, self.base.dim_orig());
        predict_gains(
            &self.schedules,
            &self.phase_one,
            &mut self.pred_one,
            &mut self.gains_one,
        )?;
        gains.tr_copy_from(&self.gains_one);

        Ok(())
    }

    /// Solve the primitive in closed form and compute the gains over the full
    /// phase column.
    ///
    /// Returns the base solution alongside a `T x n_gain_schedules` gain
    /// matrix. This path is not latency sensitive and may allocate.
    pub fn analytical_solution(
        &mut self,
        ts: &DVector<f64>,
    ) -> Result<(AnalyticalSolution, DMatrix<f64>), GainScheduleError> {
        let solution = self.base.analytical_solution(ts);

        let phases = phase_column(&solution.xs, self.base.dim_orig());
        let mut gains = DMatrix::zeros(0, 0);
        self.compute_gain_outputs(&phases, &mut gains)?;

        Ok((solution, gains))
    }

    /// Solve the primitive in closed form and package the result as a
    /// trajectory, with the gains as the trajectory's misc channel.
    pub fn analytical_trajectory(
        &mut self,
        ts: &DVector<f64>,
    ) -> Result<Trajectory, GainScheduleError> {
        let (solution, gains) = self.analytical_solution(ts)?;

        let mut trajectory = self
            .base
            .states_as_trajectory(ts, &solution.xs, &solution.xds);
        trajectory.set_misc(gains)?;

        Ok(trajectory)
    }

    /// Train the base primitive and the gain schedules on a demonstrated
    /// trajectory.
    ///
    /// The trajectory's misc channel supplies the gain training targets, one
    /// column per configured slot. The phase inputs are recovered by solving
    /// the base primitive analytically over the trajectory's time points,
    /// since the demonstration itself does not carry the internal phase.
    ///
    /// When a save directory is given and more than one slot is configured,
    /// each slot's model is persisted under a `gains<d>` subdirectory; with
    /// exactly one slot the directory is used directly.
    pub fn train(
        &mut self,
        trajectory: &Trajectory,
        save_directory: Option<&Path>,
        overwrite: bool,
    ) -> Result<(), GainScheduleError> {
        let n_schedules = self.schedules.len();

        // Precondition checks, before any mutation
        if n_schedules == 0 {
            return Err(GainScheduleError::EmptyBank);
        }
        let targets = trajectory
            .misc()
            .ok_or(GainScheduleError::MissingTargets)?;
        if targets.ncols() != n_schedules {
            return Err(GainScheduleError::TargetDimMismatch {
                expected: n_schedules,
                found: targets.ncols(),
            });
        }

        // First, train the base primitive
        self.base.train(trajectory, save_directory, overwrite)?;

        // Recover the phase over the demonstration's time points
        let solution = self.base.analytical_solution(trajectory.ts());
        let phases = phase_column(&solution.xs, self.base.dim_orig());

        for (dd, slot) in self.schedules.iter_mut().enumerate() {
            let save_directory_dim: Option<PathBuf> = save_directory.map(|dir| {
                if n_schedules == 1 {
                    dir.to_path_buf()
                } else {
                    dir.join(format!("gains{}", dd))
                }
            });

            match slot {
                None => {
                    warn!(
                        "Gain schedule {} cannot be trained because no approximator is configured",
                        dd
                    );
                }
                Some(approximator) => {
                    let target = targets.column(dd).into_owned();
                    if approximator.is_trained() {
                        approximator.retrain(
                            &phases,
                            &target,
                            save_directory_dim.as_deref(),
                            overwrite,
                        )?;
                    } else {
                        approximator.train(
                            &phases,
                            &target,
                            save_directory_dim.as_deref(),
                            overwrite,
                        )?;
                    }
                }
            }
        }

        Ok(())
    }
}

impl Clone for GainSchedulePrimitive {
    /// Deep copy: the base primitive and every present approximator are
    /// cloned, so learned state never aliases between clones. Scratch buffers
    /// are re-created rather than shared.
    fn clone(&self) -> Self {
        let n = self.schedules.len();
        Self {
            base: self.base.clone_box(),
            schedules: self.schedules.clone(),
            phase_one: DVector::zeros(1),
            pred_one: DVector::zeros(1),
            pred_batch: DVector::zeros(0),
            gains_one: DMatrix::zeros(1, n),
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Predict the gain outputs for all slots into `out`.
///
/// `pred` is the caller's scratch buffer and must have the same length as
/// `phases`. `out` is resized to `T x n` only when its shape is stale, so on
/// the per-tick path (where the shape never changes) this function does not
/// allocate.
fn predict_gains(
    schedules: &[Option<Box<dyn FunctionApproximator>>],
    phases: &DVector<f64>,
    pred: &mut DVector<f64>,
    out: &mut DMatrix<f64>,
) -> Result<(), GainScheduleError> {
    let t = phases.len();
    let n = schedules.len();

    if out.nrows() != t || out.ncols() != n {
        out.resize_mut(t, n, 0.0);
    }
    out.fill(0.0);

    for (dd, slot) in schedules.iter().enumerate() {
        if let Some(approximator) = slot {
            if approximator.is_trained() {
                approximator.predict(phases, pred)?;
                out.column_mut(dd).copy_from(pred);
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use util::maths::linspace;

    const EPS: f64 = 1e-12;

    /// A base primitive whose phase decays exponentially from 1 and whose
    /// positions move linearly from 0 to 1 over its duration.
    #[derive(Clone)]
    struct StubPrimitive {
        dim: usize,
        tau: f64,
    }

    impl StubPrimitive {
        fn new(dim: usize) -> Self {
            Self { dim, tau: 1.0 }
        }

        fn state_len(&self) -> usize {
            3 * self.dim + 1
        }
    }

    impl MovementPrimitive for StubPrimitive {
        fn dim_orig(&self) -> usize {
            self.dim
        }

        fn integrate_start(&self, x: &mut DVector<f64>, xd: &mut DVector<f64>) {
            x.fill(0.0);
            xd.fill(0.0);
            x[crate::primitive::phase_index(self.dim)] = 1.0;
        }

        fn integrate_step(
            &self,
            dt: f64,
            x: &DVector<f64>,
            x_next: &mut DVector<f64>,
            xd_next: &mut DVector<f64>,
        ) {
            let phase_idx = crate::primitive::phase_index(self.dim);
            x_next.copy_from(x);
            xd_next.fill(0.0);

            for d in 0..self.dim {
                x_next[d] = x[d] + dt / self.tau;
                xd_next[d] = 1.0 / self.tau;
            }
            x_next[phase_idx] = x[phase_idx] * (1.0 - dt / self.tau);
            xd_next[phase_idx] = -x[phase_idx] / self.tau;
        }

        fn analytical_solution(&self, ts: &DVector<f64>) -> AnalyticalSolution {
            let t = ts.len();
            let mut xs = DMatrix::zeros(t, self.state_len());
            let mut xds = DMatrix::zeros(t, self.state_len());
            let phase_idx = crate::primitive::phase_index(self.dim);

            for i in 0..t {
                for d in 0..self.dim {
                    xs[(i, d)] = ts[i] / self.tau;
                    xds[(i, d)] = 1.0 / self.tau;
                }
                xs[(i, phase_idx)] = (-ts[i] / self.tau).exp();
                xds[(i, phase_idx)] = -xs[(i, phase_idx)] / self.tau;
            }

            AnalyticalSolution {
                xs,
                xds,
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
            let t = ts.len();
            let ys = xs.columns(0, self.dim).into_owned();
            let yds = xds.columns(0, self.dim).into_owned();
            let ydds = DMatrix::zeros(t, self.dim);
            Trajectory::new(ts.clone(), ys, yds, ydds).unwrap()
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

    /// An approximator which outputs `slope * phase` once trained. Training
    /// fits the slope from the last sample, and each call is recorded so
    /// tests can inspect the save directory it was given.
    #[derive(Clone)]
    struct StubApproximator {
        slope: Option<f64>,
        calls: Rc<RefCell<Vec<Option<PathBuf>>>>,
    }

    impl StubApproximator {
        fn untrained() -> Self {
            Self {
                slope: None,
                calls: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn trained(slope: f64) -> Self {
            Self {
                slope: Some(slope),
                calls: Rc::new(RefCell::new(Vec::new())),
            }
        }
    }

    impl FunctionApproximator for StubApproximator {
        fn is_trained(&self) -> bool {
            self.slope.is_some()
        }

        fn predict(
            &self,
            inputs: &DVector<f64>,
            outputs: &mut DVector<f64>,
        ) -> Result<(), FuncApproxError> {
            let slope = self.slope.ok_or(FuncApproxError::NotTrained)?;
            for i in 0..inputs.len() {
                outputs[i] = slope * inputs[i];
            }
            Ok(())
        }

        fn train(
            &mut self,
            inputs: &DVector<f64>,
            targets: &DVector<f64>,
            save_directory: Option<&Path>,
            _overwrite: bool,
        ) -> Result<(), FuncApproxError> {
            if inputs.len() != targets.len() {
                return Err(FuncApproxError::DataLengthMismatch {
                    inputs: inputs.len(),
                    targets: targets.len(),
                });
            }
            self.calls
                .borrow_mut()
                .push(save_directory.map(|p| p.to_path_buf()));
            let last = inputs.len() - 1;
            self.slope = Some(targets[last] / inputs[last]);
            Ok(())
        }

        fn retrain(
            &mut self,
            inputs: &DVector<f64>,
            targets: &DVector<f64>,
            save_directory: Option<&Path>,
            overwrite: bool,
        ) -> Result<(), FuncApproxError> {
            self.train(inputs, targets, save_directory, overwrite)
        }

        fn clone_box(&self) -> Box<dyn FunctionApproximator> {
            // Clones get their own call log, mirroring a real deep copy
            Box::new(Self {
                slope: self.slope,
                calls: Rc::new(RefCell::new(Vec::new())),
            })
        }
    }

    fn bank(slots: Vec<Option<StubApproximator>>) -> Vec<Option<Box<dyn FunctionApproximator>>> {
        slots
            .into_iter()
            .map(|s| s.map(|a| Box::new(a) as Box<dyn FunctionApproximator>))
            .collect()
    }

    /// A demonstration with a misc channel whose column `d` is
    /// `(d + 1) * ts`, used as gain training targets.
    fn demonstration(dim: usize, n_samples: usize) -> Trajectory {
        let ts = linspace(0.0, 1.0, n_samples);
        let chan = DMatrix::zeros(n_samples, dim);
        let mut traj = Trajectory::new(ts.clone(), chan.clone(), chan.clone(), chan).unwrap();

        let misc = DMatrix::from_fn(n_samples, dim, |i, d| ((d + 1) as f64) * ts[i]);
        traj.set_misc(misc).unwrap();
        traj
    }

    #[test]
    fn test_all_absent_bank_returns_zero() {
        let mut gsp = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(3)),
            bank(vec![None, None, None]),
        )
        .unwrap();

        let phases = linspace(0.0, 1.0, 7);
        let mut out = DMatrix::zeros(0, 0);
        gsp.compute_gain_outputs(&phases, &mut out).unwrap();

        assert_eq!(out.shape(), (7, 3));
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_batch_matches_single_sample() {
        let mut gsp = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(2)),
            bank(vec![
                Some(StubApproximator::trained(2.0)),
                Some(StubApproximator::trained(-0.5)),
            ]),
        )
        .unwrap();

        let phase = 0.37;
        let mut batch = linspace(0.0, 1.0, 10);
        batch[4] = phase;

        let mut batch_out = DMatrix::zeros(0, 0);
        gsp.compute_gain_outputs(&batch, &mut batch_out).unwrap();

        let single = DVector::from_element(1, phase);
        let mut single_out = DMatrix::zeros(0, 0);
        gsp.compute_gain_outputs(&single, &mut single_out).unwrap();

        for d in 0..2 {
            assert_eq!(batch_out[(4, d)], single_out[(0, d)]);
        }
    }

    #[test]
    fn test_empty_and_full_bank_lengths() {
        let empty =
            GainSchedulePrimitive::new(Box::new(StubPrimitive::new(2)), Vec::new()).unwrap();
        assert_eq!(empty.n_gain_schedules(), 0);

        let full = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(2)),
            bank(vec![
                Some(StubApproximator::untrained()),
                Some(StubApproximator::untrained()),
            ]),
        )
        .unwrap();
        assert_eq!(full.n_gain_schedules(), 2);

        // A non-empty bank of the wrong length is rejected
        assert!(matches!(
            GainSchedulePrimitive::new(
                Box::new(StubPrimitive::new(2)),
                bank(vec![Some(StubApproximator::untrained())]),
            ),
            Err(GainScheduleError::BankDimMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_bank_gain_computation_is_noop() {
        let mut gsp =
            GainSchedulePrimitive::new(Box::new(StubPrimitive::new(2)), Vec::new()).unwrap();

        let phases = linspace(0.0, 1.0, 5);
        let mut out = DMatrix::zeros(0, 0);
        gsp.compute_gain_outputs(&phases, &mut out).unwrap();
        assert_eq!(out.shape(), (5, 0));

        // Training with an empty bank is a caller error
        let demo = demonstration(2, 5);
        assert!(matches!(
            gsp.train(&demo, None, false),
            Err(GainScheduleError::EmptyBank)
        ));
    }

    #[test]
    fn test_integrate_start_and_step_gains() {
        let mut gsp = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(1)),
            bank(vec![Some(StubApproximator::trained(3.0))]),
        )
        .unwrap();

        let state_len = 4;
        let mut x = DVector::zeros(state_len);
        let mut xd = DVector::zeros(state_len);
        let mut gains = DVector::zeros(1);

        gsp.integrate_start(&mut x, &mut xd, &mut gains).unwrap();
        // Initial phase is 1.0, so the gain is the slope
        assert!((gains[0] - 3.0).abs() < EPS);

        let mut x_next = DVector::zeros(state_len);
        let mut xd_next = DVector::zeros(state_len);
        let dt = 0.1;
        gsp.integrate_step(dt, &x, &mut x_next, &mut xd_next, &mut gains)
            .unwrap();

        // The gain tracks the phase of the updated state, not the pre-step
        // state
        let phase_next = phase_of_state(&x_next, 1);
        assert!((phase_next - 0.9).abs() < EPS);
        assert!((gains[0] - 3.0 * phase_next).abs() < EPS);
    }

    #[test]
    fn test_untrained_slot_predicts_zero() {
        let mut gsp = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(2)),
            bank(vec![
                Some(StubApproximator::trained(2.0)),
                Some(StubApproximator::untrained()),
            ]),
        )
        .unwrap();

        let phases = DVector::from_element(1, 0.5);
        let mut out = DMatrix::zeros(0, 0);
        gsp.compute_gain_outputs(&phases, &mut out).unwrap();

        assert!((out[(0, 0)] - 1.0).abs() < EPS);
        assert_eq!(out[(0, 1)], 0.0);
    }

    #[test]
    fn test_analytical_trajectory_carries_gains_as_misc() {
        let mut gsp = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(1)),
            bank(vec![Some(StubApproximator::trained(2.0))]),
        )
        .unwrap();

        let ts = linspace(0.0, 1.0, 20);
        let trajectory = gsp.analytical_trajectory(&ts).unwrap();

        let misc = trajectory.misc().expect("gains should be set as misc");
        assert_eq!(misc.shape(), (20, 1));

        // Gains follow the phase: slope * exp(-t)
        for i in 0..20 {
            let expected = 2.0 * (-ts[i]).exp();
            assert!((misc[(i, 0)] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_train_target_mismatch_is_rejected() {
        let mut gsp = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(2)),
            bank(vec![
                Some(StubApproximator::untrained()),
                Some(StubApproximator::untrained()),
            ]),
        )
        .unwrap();

        // Misc channel with the wrong number of columns
        let mut demo = demonstration(2, 10);
        demo.set_misc(DMatrix::zeros(10, 3)).unwrap();

        assert!(matches!(
            gsp.train(&demo, None, false),
            Err(GainScheduleError::TargetDimMismatch {
                expected: 2,
                found: 3
            })
        ));

        // No misc channel at all
        let ts = linspace(0.0, 1.0, 10);
        let chan = DMatrix::zeros(10, 2);
        let no_misc = Trajectory::new(ts, chan.clone(), chan.clone(), chan).unwrap();
        assert!(matches!(
            gsp.train(&no_misc, None, false),
            Err(GainScheduleError::MissingTargets)
        ));
    }

    #[test]
    fn test_train_skips_absent_slots() {
        let mut gsp = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(2)),
            bank(vec![Some(StubApproximator::untrained()), None]),
        )
        .unwrap();

        let demo = demonstration(2, 10);
        gsp.train(&demo, None, false).unwrap();

        // The present slot is now trained and predicts non-zero gains
        let phases = DVector::from_element(1, 0.5);
        let mut out = DMatrix::zeros(0, 0);
        gsp.compute_gain_outputs(&phases, &mut out).unwrap();
        assert!(out[(0, 0)] != 0.0);
        assert_eq!(out[(0, 1)], 0.0);
    }

    #[test]
    fn test_train_save_directories_per_dimension() {
        let fa0 = StubApproximator::untrained();
        let fa1 = StubApproximator::untrained();
        let calls0 = fa0.calls.clone();
        let calls1 = fa1.calls.clone();

        // The boxed slots share the stubs' call logs through the Rc handles
        // cloned above
        let schedules: Vec<Option<Box<dyn FunctionApproximator>>> = vec![
            Some(Box::new(fa0) as Box<dyn FunctionApproximator>),
            Some(Box::new(fa1) as Box<dyn FunctionApproximator>),
        ];

        let mut gsp =
            GainSchedulePrimitive::new(Box::new(StubPrimitive::new(2)), schedules).unwrap();

        let demo = demonstration(2, 10);
        let save_dir = std::env::temp_dir().join("gain_schedule_train_test");
        gsp.train(&demo, Some(&save_dir), true).unwrap();

        assert_eq!(
            calls0.borrow().last().unwrap().as_deref(),
            Some(save_dir.join("gains0").as_path())
        );
        assert_eq!(
            calls1.borrow().last().unwrap().as_deref(),
            Some(save_dir.join("gains1").as_path())
        );
    }

    #[test]
    fn test_clone_isolation() {
        let mut original = GainSchedulePrimitive::new(
            Box::new(StubPrimitive::new(1)),
            bank(vec![Some(StubApproximator::trained(2.0))]),
        )
        .unwrap();

        let mut cloned = original.clone();

        // Retrain the clone with different targets
        let ts = linspace(0.0, 1.0, 10);
        let chan = DMatrix::zeros(10, 1);
        let mut demo = Trajectory::new(ts.clone(), chan.clone(), chan.clone(), chan).unwrap();
        demo.set_misc(DMatrix::from_fn(10, 1, |i, _| -5.0 * (-ts[i]).exp()))
            .unwrap();
        cloned.train(&demo, None, false).unwrap();

        // The original's predictions are unchanged
        let phases = DVector::from_element(1, 0.5);
        let mut out_original = DMatrix::zeros(0, 0);
        let mut out_cloned = DMatrix::zeros(0, 0);
        original
            .compute_gain_outputs(&phases, &mut out_original)
            .unwrap();
        cloned
            .compute_gain_outputs(&phases, &mut out_cloned)
            .unwrap();

        assert!((out_original[(0, 0)] - 1.0).abs() < EPS);
        assert!(out_original[(0, 0)] != out_cloned[(0, 0)]);
    }
}
