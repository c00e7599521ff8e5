//! # Task evaluation library
//!
//! This library scores rollouts of a movement primitive against a task
//! objective. A task decomposes an executed or simulated trajectory into
//! weighted cost components whose sum is the scalar objective consumed by an
//! external black-box optimizer.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod params;
pub mod rollout;
pub mod task;
pub mod viapoint;

// ---------------------------------------------------------------------------
// RE-EXPORTS
// ---------------------------------------------------------------------------

pub use rollout::Rollout;
pub use task::{Task, TaskError};
pub use viapoint::{TaskViapoint, ViapointTime};
