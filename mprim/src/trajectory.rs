//! # Trajectory
//!
//! A trajectory is a time-indexed sequence of (position, velocity,
//! acceleration) samples, optionally carrying a "misc" matrix of per-sample
//! auxiliary values. The misc channel is how gain-schedule training targets
//! travel alongside a demonstrated trajectory.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Internal
use util::maths::first_at_or_after;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A time-indexed motion trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    /// Time points, length `T`
    ts: DVector<f64>,

    /// Positions, `T x D`
    ys: DMatrix<f64>,

    /// Velocities, `T x D`
    yds: DMatrix<f64>,

    /// Accelerations, `T x D`
    ydds: DMatrix<f64>,

    /// Optional auxiliary values, `T x M`
    misc: Option<DMatrix<f64>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur when constructing or manipulating trajectories.
#[derive(Debug, Error)]
pub enum TrajectoryError {
    /// A channel does not match the shape implied by the time points.
    #[error("Trajectory channel {channel} has shape {found:?} but {expected:?} was expected")]
    ChannelShapeMismatch {
        channel: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// A trajectory needs at least two samples to be meaningful.
    #[error("A trajectory requires at least 2 samples, got {0}")]
    TooFewSamples(usize),

    /// Time points must be strictly increasing.
    #[error("Time points must be strictly increasing")]
    NonIncreasingTime,

    /// The misc channel must have one row per sample.
    #[error("Misc channel has {found} rows but the trajectory has {expected} samples")]
    MiscShapeMismatch { expected: usize, found: usize },

    /// Boundary condition vectors passed to a generator don't agree in size.
    #[error("Boundary condition vectors must all have the same dimensionality")]
    BoundaryDimMismatch,

    /// The viapoint time must fall strictly within the generated time range.
    #[error("Viapoint time {0} does not fall strictly within the time points")]
    ViapointTimeOutOfRange(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    /// Create a new trajectory from its core channels.
    ///
    /// All channels must have one row per time point and the same number of
    /// columns.
    pub fn new(
        ts: DVector<f64>,
        ys: DMatrix<f64>,
        yds: DMatrix<f64>,
        ydds: DMatrix<f64>,
    ) -> Result<Self, TrajectoryError> {
        let n_samples = ts.len();
        let n_dims = ys.ncols();

        if n_samples < 2 {
            return Err(TrajectoryError::TooFewSamples(n_samples));
        }

        let expected = (n_samples, n_dims);
        for &(channel, shape) in &[
            ("ys", ys.shape()),
            ("yds", yds.shape()),
            ("ydds", ydds.shape()),
        ] {
            if shape != expected {
                return Err(TrajectoryError::ChannelShapeMismatch {
                    channel,
                    expected,
                    found: shape,
                });
            }
        }

        Ok(Self {
            ts,
            ys,
            yds,
            ydds,
            misc: None,
        })
    }

    /// The number of samples in the trajectory.
    pub fn len(&self) -> usize {
        self.ts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ts.len() == 0
    }

    /// The number of dimensions of the trajectory.
    pub fn dim(&self) -> usize {
        self.ys.ncols()
    }

    pub fn ts(&self) -> &DVector<f64> {
        &self.ts
    }

    pub fn ys(&self) -> &DMatrix<f64> {
        &self.ys
    }

    pub fn yds(&self) -> &DMatrix<f64> {
        &self.yds
    }

    pub fn ydds(&self) -> &DMatrix<f64> {
        &self.ydds
    }

    /// The auxiliary channel, if one has been set.
    pub fn misc(&self) -> Option<&DMatrix<f64>> {
        self.misc.as_ref()
    }

    /// Set the auxiliary channel.
    ///
    /// The matrix must have one row per sample of the trajectory.
    pub fn set_misc(&mut self, misc: DMatrix<f64>) -> Result<(), TrajectoryError> {
        if misc.nrows() != self.len() {
            return Err(TrajectoryError::MiscShapeMismatch {
                expected: self.len(),
                found: misc.nrows(),
            });
        }

        self.misc = Some(misc);
        Ok(())
    }

    /// Generate a minimum-jerk (quintic polynomial) trajectory between two
    /// boundary conditions over the given time points.
    pub fn polynomial(
        ts: &DVector<f64>,
        y_from: &DVector<f64>,
        yd_from: &DVector<f64>,
        ydd_from: &DVector<f64>,
        y_to: &DVector<f64>,
        yd_to: &DVector<f64>,
        ydd_to: &DVector<f64>,
    ) -> Result<Self, TrajectoryError> {
        let n_samples = ts.len();
        let n_dims = y_from.len();

        if n_samples < 2 {
            return Err(TrajectoryError::TooFewSamples(n_samples));
        }

        for v in &[yd_from, ydd_from, y_to, yd_to, ydd_to] {
            if v.len() != n_dims {
                return Err(TrajectoryError::BoundaryDimMismatch);
            }
        }

        let duration = ts[n_samples - 1] - ts[0];
        if duration <= 0.0 {
            return Err(TrajectoryError::NonIncreasingTime);
        }

        // Work in normalised time tau in [0, 1], with the boundary
        // derivatives scaled accordingly
        let v0 = yd_from * duration;
        let v1 = yd_to * duration;
        let c0 = ydd_from * (duration * duration);
        let c1 = ydd_to * (duration * duration);

        // Residuals of the three end-point conditions after removing the
        // start-point terms
        let s = y_to - y_from - &v0 - &c0 * 0.5;
        let p = &v1 - &v0 - &c0;
        let q = &c1 - &c0;

        // Quintic coefficients solving the boundary value problem
        let a0 = y_from.clone();
        let a1 = v0;
        let a2 = &c0 * 0.5;
        let a3 = &s * 10.0 - &p * 4.0 + &q * 0.5;
        let a4 = &s * -15.0 + &p * 7.0 - &q;
        let a5 = &s * 6.0 - &p * 3.0 + &q * 0.5;

        let mut ys = DMatrix::zeros(n_samples, n_dims);
        let mut yds = DMatrix::zeros(n_samples, n_dims);
        let mut ydds = DMatrix::zeros(n_samples, n_dims);

        for i in 0..n_samples {
            let tau = (ts[i] - ts[0]) / duration;
            let tau2 = tau * tau;
            let tau3 = tau2 * tau;
            let tau4 = tau3 * tau;
            let tau5 = tau4 * tau;

            let y = &a0 + &a1 * tau + &a2 * tau2 + &a3 * tau3 + &a4 * tau4 + &a5 * tau5;
            let yd =
                &a1 + &a2 * (2.0 * tau) + &a3 * (3.0 * tau2) + &a4 * (4.0 * tau3) + &a5 * (5.0 * tau4);
            let ydd = &a2 * 2.0 + &a3 * (6.0 * tau) + &a4 * (12.0 * tau2) + &a5 * (20.0 * tau3);

            ys.row_mut(i).tr_copy_from(&y);
            yds.row_mut(i).tr_copy_from(&(yd / duration));
            ydds.row_mut(i).tr_copy_from(&(ydd / (duration * duration)));
        }

        Self::new(ts.clone(), ys, yds, ydds)
    }

    /// Generate a trajectory which starts and ends at rest and passes through
    /// a viapoint condition `(y, yd, ydd)` at the first sample at or after
    /// `viapoint_time`.
    ///
    /// The trajectory is built from two minimum-jerk segments joined at the
    /// viapoint sample, so the viapoint condition is satisfied exactly at that
    /// sample.
    pub fn polynomial_through_viapoint(
        ts: &DVector<f64>,
        y_from: &DVector<f64>,
        y_via: &DVector<f64>,
        yd_via: &DVector<f64>,
        ydd_via: &DVector<f64>,
        viapoint_time: f64,
        y_to: &DVector<f64>,
    ) -> Result<Self, TrajectoryError> {
        let n_samples = ts.len();
        let n_dims = y_from.len();

        if n_samples < 3 {
            return Err(TrajectoryError::TooFewSamples(n_samples));
        }

        // The viapoint sample must leave at least two samples on either side
        // so both segments have a positive duration
        let via_index = match first_at_or_after(ts, viapoint_time) {
            Some(i) if i >= 1 && i <= n_samples - 2 => i,
            _ => return Err(TrajectoryError::ViapointTimeOutOfRange(viapoint_time)),
        };

        let rest = DVector::zeros(n_dims);

        let ts_first = ts.rows(0, via_index + 1).into_owned();
        let first = Self::polynomial(&ts_first, y_from, &rest, &rest, y_via, yd_via, ydd_via)?;

        let ts_second = ts.rows(via_index, n_samples - via_index).into_owned();
        let second = Self::polynomial(&ts_second, y_via, yd_via, ydd_via, y_to, &rest, &rest)?;

        // Join the segments, taking the viapoint sample from the first
        let mut ys = DMatrix::zeros(n_samples, n_dims);
        let mut yds = DMatrix::zeros(n_samples, n_dims);
        let mut ydds = DMatrix::zeros(n_samples, n_dims);

        for i in 0..=via_index {
            ys.row_mut(i).copy_from(&first.ys.row(i));
            yds.row_mut(i).copy_from(&first.yds.row(i));
            ydds.row_mut(i).copy_from(&first.ydds.row(i));
        }
        for i in (via_index + 1)..n_samples {
            ys.row_mut(i).copy_from(&second.ys.row(i - via_index));
            yds.row_mut(i).copy_from(&second.yds.row(i - via_index));
            ydds.row_mut(i).copy_from(&second.ydds.row(i - via_index));
        }

        Self::new(ts.clone(), ys, yds, ydds)
    }
}
