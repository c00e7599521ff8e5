//! # Rollout
//!
//! A rollout is one concrete simulated or executed trajectory, tabulated with
//! one row per time step. The column layout is fixed:
//!
//! ```text
//! t  y_1..y_D  yd_1..yd_D  ydd_1..ydd_D  forcing_1..forcing_D
//! ```
//!
//! giving `1 + 4 * D` columns for `D` dimensions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

// Internal
use crate::task::TaskError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A tabulated rollout with a validated column layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rollout {
    cost_vars: DMatrix<f64>,
    n_dims: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rollout {
    /// Wrap a cost-variable table, validating it against the fixed
    /// `1 + 4 * n_dims` column layout.
    pub fn from_matrix(cost_vars: DMatrix<f64>, n_dims: usize) -> Result<Self, TaskError> {
        let expected = 1 + 4 * n_dims;
        if cost_vars.ncols() != expected {
            return Err(TaskError::RolloutShapeMismatch {
                expected,
                found: cost_vars.ncols(),
                n_dims,
            });
        }

        Ok(Self { cost_vars, n_dims })
    }

    pub fn n_time_steps(&self) -> usize {
        self.cost_vars.nrows()
    }

    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    /// The time column.
    pub fn ts(&self) -> DVector<f64> {
        self.cost_vars.column(0).into_owned()
    }

    /// The position columns, `T x D`.
    pub fn positions(&self) -> DMatrix<f64> {
        self.cost_vars.columns(1, self.n_dims).into_owned()
    }

    /// The velocity columns, `T x D`.
    pub fn velocities(&self) -> DMatrix<f64> {
        self.cost_vars
            .columns(1 + self.n_dims, self.n_dims)
            .into_owned()
    }

    /// The acceleration columns, `T x D`.
    pub fn accelerations(&self) -> DMatrix<f64> {
        self.cost_vars
            .columns(1 + 2 * self.n_dims, self.n_dims)
            .into_owned()
    }

    /// The forcing term columns, `T x D`.
    pub fn forcing_terms(&self) -> DMatrix<f64> {
        self.cost_vars
            .columns(1 + 3 * self.n_dims, self.n_dims)
            .into_owned()
    }
}
