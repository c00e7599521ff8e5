//! # Movement primitive capability
//!
//! The base movement primitive owns the canonical dynamical state and produces
//! the nominal trajectory shape. Concrete engines (spring-damper, exponential,
//! sigmoid and phase/time systems) live outside this library; this module
//! defines the capability contract consumed by the gain schedule extension.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector};
use std::path::Path;
use thiserror::Error;

// Internal
use crate::func_approx::FuncApproxError;
use crate::trajectory::Trajectory;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The closed-form solution of a primitive over a series of time points.
///
/// All matrices have one row per time point.
#[derive(Debug, Clone)]
pub struct AnalyticalSolution {
    /// State vectors, `T x (3 * dim_orig + 1)`
    pub xs: DMatrix<f64>,

    /// State derivative vectors, same shape as `xs`
    pub xds: DMatrix<f64>,

    /// Forcing term values, `T x dim_orig`
    pub forcing_terms: DMatrix<f64>,

    /// Raw forcing approximator outputs, `T x dim_orig`
    pub forcing_outputs: DMatrix<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while using a movement primitive.
#[derive(Debug, Error)]
pub enum PrimitiveError {
    /// The trajectory used for training does not match the primitive's
    /// dimensionality.
    #[error("Trajectory dimensionality {found} does not match primitive dimensionality {expected}")]
    TrajectoryDimMismatch { expected: usize, found: usize },

    /// A forcing term approximator failed to train.
    #[error("Error training forcing term approximator: {0}")]
    FuncApprox(#[from] FuncApproxError),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A dynamical-system-driven trajectory generator.
pub trait MovementPrimitive {
    /// The number of original (task space) dimensions of the primitive.
    fn dim_orig(&self) -> usize;

    /// Produce the initial state and state derivative of the primitive.
    ///
    /// Both `x` and `xd` must have length `3 * dim_orig + 1` and are
    /// overwritten in place.
    fn integrate_start(&self, x: &mut DVector<f64>, xd: &mut DVector<f64>);

    /// Integrate the primitive one fixed step forward from state `x`.
    ///
    /// `x_next` and `xd_next` are overwritten in place. This is the real-time
    /// path and must not allocate.
    fn integrate_step(
        &self,
        dt: f64,
        x: &DVector<f64>,
        x_next: &mut DVector<f64>,
        xd_next: &mut DVector<f64>,
    );

    /// Solve the primitive in closed form over the given time points.
    fn analytical_solution(&self, ts: &DVector<f64>) -> AnalyticalSolution;

    /// Convert a series of states and state derivatives into a trajectory.
    fn states_as_trajectory(
        &self,
        ts: &DVector<f64>,
        xs: &DMatrix<f64>,
        xds: &DMatrix<f64>,
    ) -> Trajectory;

    /// Train the primitive on a demonstrated trajectory.
    fn train(
        &mut self,
        trajectory: &Trajectory,
        save_directory: Option<&Path>,
        overwrite: bool,
    ) -> Result<(), PrimitiveError>;

    /// Produce an independent deep copy of this primitive.
    fn clone_box(&self) -> Box<dyn MovementPrimitive>;
}

impl Clone for Box<dyn MovementPrimitive> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Index of the phase element within a primitive state vector.
///
/// The state vector is the ordered concatenation of per-dimension position,
/// velocity and goal segments followed by a single phase scalar, giving a
/// total length of `3 * dim_orig + 1`. The phase therefore always lives at
/// offset `3 * dim_orig`.
pub const fn phase_index(dim_orig: usize) -> usize {
    3 * dim_orig
}

/// Extract the phase value from a single state vector.
pub fn phase_of_state(x: &DVector<f64>, dim_orig: usize) -> f64 {
    x[phase_index(dim_orig)]
}

/// Extract the phase column from a batch of state vectors (one per row).
pub fn phase_column(xs: &DMatrix<f64>, dim_orig: usize) -> DVector<f64> {
    xs.column(phase_index(dim_orig)).into_owned()
}
