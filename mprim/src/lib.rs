//! # Movement primitive library
//!
//! This library provides the building blocks for parameterised, time-evolving
//! motion trajectories ("movement primitives"). The trajectory shape itself is
//! produced by a base dynamical-system primitive, which this library consumes
//! through the [`primitive::MovementPrimitive`] capability trait. On top of
//! that base this library provides [`gain_schedules::GainSchedulePrimitive`],
//! which augments every integration step with a bank of per-dimension gain
//! signals predicted by learned function approximators.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod func_approx;
pub mod gain_schedules;
pub mod primitive;
pub mod trajectory;

// ---------------------------------------------------------------------------
// RE-EXPORTS
// ---------------------------------------------------------------------------

pub use func_approx::{FuncApproxError, FunctionApproximator};
pub use gain_schedules::{GainScheduleError, GainSchedulePrimitive};
pub use primitive::{AnalyticalSolution, MovementPrimitive, PrimitiveError};
pub use trajectory::{Trajectory, TrajectoryError};
