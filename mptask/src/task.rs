//! # Task capability
//!
//! A task maps a rollout to a cost vector. The cost vector has a fixed
//! layout: element 0 is the total cost, followed by one element per cost
//! component, with `total = sum(components)`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DVector;
use thiserror::Error;

// Internal
use crate::rollout::Rollout;
use mprim::TrajectoryError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while constructing or evaluating a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// The viapoint and goal must have the same dimensionality.
    #[error("Viapoint dimensionality {viapoint} does not match goal dimensionality {goal}")]
    DimMismatch { viapoint: usize, goal: usize },

    /// The viapoint radius defines a zero-cost zone and cannot be negative.
    #[error("Viapoint radius must be non-negative, got {0}")]
    NegativeRadius(f64),

    /// The rollout table does not match the expected `1 + 4 * D` layout.
    #[error("Rollout has {found} columns but {expected} were expected for {n_dims} dimensions")]
    RolloutShapeMismatch {
        expected: usize,
        found: usize,
        n_dims: usize,
    },

    /// The rollout's dimensionality does not match the task's.
    #[error("Rollout dimensionality {found} does not match task dimensionality {expected}")]
    RolloutDimMismatch { expected: usize, found: usize },

    /// A target time lies beyond the last sample of the rollout.
    #[error("Time {0} is beyond the last sample of the rollout")]
    TimeOutOfRange(f64),

    /// Demonstration task parameters must be a single row, one value per
    /// dimension.
    #[error("Task parameters must be a single row of {expected} values")]
    TaskParamShapeMismatch { expected: usize },

    /// Demonstrations need a concrete viapoint time to pass through.
    #[error("Cannot generate a demonstration in minimum-distance mode")]
    DemonstrationRequiresTime,

    #[error("Error generating the demonstration trajectory: {0}")]
    Trajectory(#[from] TrajectoryError),

    /// A task file could not be read or written.
    #[error("Could not read or write task file: {0}")]
    Io(#[from] std::io::Error),

    /// A field of a task file could not be parsed as a number.
    #[error("Could not parse field {0} of task file")]
    ParseField(usize),

    /// A task file's field count does not fit the `2 * n_dims + 6` layout.
    #[error("Task file has {0} fields, which does not match the 2 * n_dims + 6 layout")]
    FieldCountMismatch(usize),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A cost function over rollouts.
pub trait Task {
    /// Evaluate a rollout, producing a cost vector of length
    /// `1 + n_cost_components`.
    ///
    /// `sample` is the parameter sample which produced the rollout and
    /// `task_parameters` are optional per-rollout task parameters; both are
    /// passed through by the optimizer and may be ignored by tasks which do
    /// not use them.
    fn evaluate_rollout(
        &self,
        rollout: &Rollout,
        sample: &DVector<f64>,
        task_parameters: &DVector<f64>,
    ) -> Result<DVector<f64>, TaskError>;

    /// The number of cost components this task produces.
    fn n_cost_components(&self) -> usize;
}
