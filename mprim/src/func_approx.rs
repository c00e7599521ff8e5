//! # Function approximator capability
//!
//! A function approximator is an opaque trainable mapping from a scalar input
//! (here always the primitive's phase) to a scalar output. The concrete
//! approximation scheme is supplied by the surrounding system; this module
//! only defines the capability contract consumed by the rest of the library.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DVector;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while using a function approximator.
#[derive(Debug, Error)]
pub enum FuncApproxError {
    /// Prediction was requested on an approximator which has not been trained.
    #[error("Cannot predict with an untrained function approximator")]
    NotTrained,

    /// The training inputs and targets have different lengths.
    #[error("Training inputs have {inputs} samples but targets have {targets}")]
    DataLengthMismatch { inputs: usize, targets: usize },

    /// The trained model could not be persisted to disk.
    #[error("Could not write trained model: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trainable scalar-to-scalar mapping.
///
/// Implementations are free to choose any approximation scheme. The contract
/// here is what the movement primitive layer relies on:
///
/// - `predict` is only called once `is_trained` returns true; an untrained
///   implementation may return [`FuncApproxError::NotTrained`].
/// - `predict` must write exactly `inputs.len()` values into `outputs`, which
///   the caller has already sized, without reallocating it. The real-time
///   integration path relies on this.
pub trait FunctionApproximator {
    /// Returns true once the approximator has been trained.
    fn is_trained(&self) -> bool;

    /// Predict the output for each input sample, writing into `outputs`.
    fn predict(
        &self,
        inputs: &DVector<f64>,
        outputs: &mut DVector<f64>,
    ) -> Result<(), FuncApproxError>;

    /// Train the approximator on the given input/target pairs.
    ///
    /// If `save_directory` is `Some` the trained model is persisted there,
    /// overwriting any existing model if `overwrite` is set.
    fn train(
        &mut self,
        inputs: &DVector<f64>,
        targets: &DVector<f64>,
        save_directory: Option<&Path>,
        overwrite: bool,
    ) -> Result<(), FuncApproxError>;

    /// Retrain an already trained approximator on new input/target pairs.
    fn retrain(
        &mut self,
        inputs: &DVector<f64>,
        targets: &DVector<f64>,
        save_directory: Option<&Path>,
        overwrite: bool,
    ) -> Result<(), FuncApproxError>;

    /// Produce an independent deep copy of this approximator.
    ///
    /// Learned state must never alias between the original and the copy.
    fn clone_box(&self) -> Box<dyn FunctionApproximator>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Clone for Box<dyn FunctionApproximator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
