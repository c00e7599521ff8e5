//! # Viapoint task
//!
//! A task which rewards trajectories that pass through (or near) an
//! intermediate point, move smoothly, and settle on a terminal goal by a
//! given time. The cost vector has three components:
//!
//! 1. distance to the viapoint, at a fixed time or at the closest approach
//! 2. mean squared acceleration over the rollout
//! 3. summed squared distance to the goal after the goal time
//!
//! each multiplied by its weight, with the total in element 0.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

// Internal
use crate::params::Params;
use crate::rollout::Rollout;
use crate::task::{Task, TaskError};
use mprim::Trajectory;
use util::maths::first_at_or_after;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of cost components produced by this task.
const N_COST_COMPONENTS: usize = 3;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// When the distance to the viapoint is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViapointTime {
    /// Evaluate the distance at the first sample at or after this time.
    AtTime(f64),

    /// Evaluate the minimum distance over the whole trajectory.
    AtMinimumDistance,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Viapoint task parameters and weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskViapoint {
    /// The intermediate point the trajectory should pass through
    viapoint: DVector<f64>,

    /// When the distance to the viapoint is evaluated
    viapoint_time: ViapointTime,

    /// Radius around the viapoint within which the viapoint cost is zero
    viapoint_radius: f64,

    /// The terminal goal point
    goal: DVector<f64>,

    /// The time by which the trajectory should have settled on the goal
    goal_time: f64,

    /// Weight of the viapoint cost component
    viapoint_weight: f64,

    /// Weight of the acceleration cost component
    acceleration_weight: f64,

    /// Weight of the goal-delay cost component
    goal_weight: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TaskViapoint {
    /// Create a task with only the viapoint cost active (plus a small
    /// acceleration weight to regularise the motion).
    pub fn new(viapoint: DVector<f64>, viapoint_time: ViapointTime) -> Result<Self, TaskError> {
        let goal = DVector::from_element(viapoint.len(), 1.0);
        Self::with_weights(
            viapoint,
            viapoint_time,
            0.0,
            goal,
            -1.0,
            1.0,
            0.0001,
            0.0,
        )
    }

    /// Create a task with both the viapoint and goal costs active.
    pub fn with_goal(
        viapoint: DVector<f64>,
        viapoint_time: ViapointTime,
        goal: DVector<f64>,
        goal_time: f64,
    ) -> Result<Self, TaskError> {
        Self::with_weights(
            viapoint,
            viapoint_time,
            0.0,
            goal,
            goal_time,
            1.0,
            0.0001,
            1.0,
        )
    }

    /// Create a fully specified task.
    pub fn with_weights(
        viapoint: DVector<f64>,
        viapoint_time: ViapointTime,
        viapoint_radius: f64,
        goal: DVector<f64>,
        goal_time: f64,
        viapoint_weight: f64,
        acceleration_weight: f64,
        goal_weight: f64,
    ) -> Result<Self, TaskError> {
        if viapoint.len() != goal.len() {
            return Err(TaskError::DimMismatch {
                viapoint: viapoint.len(),
                goal: goal.len(),
            });
        }
        if viapoint_radius < 0.0 {
            return Err(TaskError::NegativeRadius(viapoint_radius));
        }

        Ok(Self {
            viapoint,
            viapoint_time,
            viapoint_radius,
            goal,
            goal_time,
            viapoint_weight,
            acceleration_weight,
            goal_weight,
        })
    }

    /// Create a task from a loaded parameter struct.
    pub fn from_params(params: &Params) -> Result<Self, TaskError> {
        let viapoint_time = match params.viapoint_time {
            Some(t) => ViapointTime::AtTime(t),
            None => ViapointTime::AtMinimumDistance,
        };

        Self::with_weights(
            DVector::from_vec(params.viapoint.clone()),
            viapoint_time,
            params.viapoint_radius,
            DVector::from_vec(params.goal.clone()),
            params.goal_time,
            params.viapoint_weight,
            params.acceleration_weight,
            params.goal_weight,
        )
    }

    /// The dimensionality of the task space.
    pub fn n_dims(&self) -> usize {
        self.viapoint.len()
    }

    /// Set the weights of the three cost components.
    pub fn set_cost_function_weighting(
        &mut self,
        viapoint_weight: f64,
        acceleration_weight: f64,
        goal_weight: f64,
    ) {
        self.viapoint_weight = viapoint_weight;
        self.acceleration_weight = acceleration_weight;
        self.goal_weight = goal_weight;
    }

    /// Compute the cost vector for a trajectory.
    ///
    /// `y` and `ydd` are the positions and accelerations, one row per time
    /// point. The output layout is `[total, viapoint, acceleration, goal]`;
    /// components with zero weight are skipped but still occupy their slot
    /// with value 0.
    pub fn compute_costs(
        &self,
        ts: &DVector<f64>,
        y: &DMatrix<f64>,
        ydd: &DMatrix<f64>,
    ) -> Result<DVector<f64>, TaskError> {
        let n_time_steps = ts.len();

        let mut dist_to_viapoint = 0.0;
        if self.viapoint_weight != 0.0 {
            dist_to_viapoint = match self.viapoint_time {
                ViapointTime::AtMinimumDistance => {
                    // Closest approach over the whole trajectory
                    (0..n_time_steps)
                        .map(|i| (y.row(i).transpose() - &self.viapoint).norm())
                        .fold(f64::INFINITY, f64::min)
                }
                ViapointTime::AtTime(t) => {
                    let i = first_at_or_after(ts, t).ok_or(TaskError::TimeOutOfRange(t))?;
                    (y.row(i).transpose() - &self.viapoint).norm()
                }
            };

            if self.viapoint_radius > 0.0 {
                // Within the radius the cost is always zero
                dist_to_viapoint = (dist_to_viapoint - self.viapoint_radius).max(0.0);
            }
        }

        let mut mean_ydd = 0.0;
        if self.acceleration_weight != 0.0 {
            mean_ydd = ydd.iter().map(|v| v * v).sum::<f64>() / (n_time_steps as f64);
        }

        let mut delay_cost = 0.0;
        if self.goal_weight != 0.0 {
            let goal_step = first_at_or_after(ts, self.goal_time)
                .ok_or(TaskError::TimeOutOfRange(self.goal_time))?;

            // Penalise every sample from the goal time onwards for its
            // distance to the goal
            delay_cost = (goal_step..n_time_steps)
                .map(|i| (y.row(i).transpose() - &self.goal).norm_squared())
                .sum();
        }

        let mut costs = DVector::zeros(1 + N_COST_COMPONENTS);
        costs[1] = self.viapoint_weight * dist_to_viapoint;
        costs[2] = self.acceleration_weight * mean_ydd;
        costs[3] = self.goal_weight * delay_cost;
        costs[0] = costs[1] + costs[2] + costs[3];

        Ok(costs)
    }

    /// Generate a demonstration trajectory satisfying the task's constraints.
    ///
    /// The demonstration starts at rest at the origin, passes through the
    /// given position (with unit velocity and zero acceleration) at the
    /// viapoint time, and ends at rest at the goal. `task_parameters` must be
    /// a single row with one position value per dimension.
    pub fn generate_demonstration(
        &self,
        task_parameters: &DMatrix<f64>,
        ts: &DVector<f64>,
    ) -> Result<Trajectory, TaskError> {
        let n_dims = self.n_dims();

        if task_parameters.nrows() != 1 || task_parameters.ncols() != n_dims {
            return Err(TaskError::TaskParamShapeMismatch { expected: n_dims });
        }

        let viapoint_time = match self.viapoint_time {
            ViapointTime::AtTime(t) => t,
            ViapointTime::AtMinimumDistance => return Err(TaskError::DemonstrationRequiresTime),
        };

        let y_from = DVector::zeros(n_dims);
        let y_via = task_parameters.row(0).transpose();
        let yd_via = DVector::from_element(n_dims, 1.0);
        let ydd_via = DVector::zeros(n_dims);

        let trajectory = Trajectory::polynomial_through_viapoint(
            ts,
            &y_from,
            &y_via,
            &yd_via,
            &ydd_via,
            viapoint_time,
            &self.goal,
        )?;

        Ok(trajectory)
    }

    /// Write the task as a single-row numeric record.
    ///
    /// The field order is `[viapoint(D), viapoint_time, viapoint_radius,
    /// goal(D), goal_time, viapoint_weight, acceleration_weight,
    /// goal_weight]`. Minimum-distance mode is stored as a viapoint time of
    /// -1.
    pub fn write_to_file(&self, path: &std::path::Path) -> Result<(), TaskError> {
        let viapoint_time = match self.viapoint_time {
            ViapointTime::AtTime(t) => t,
            ViapointTime::AtMinimumDistance => -1.0,
        };

        let mut fields: Vec<f64> = Vec::with_capacity(2 * self.n_dims() + 6);
        fields.extend(self.viapoint.iter());
        fields.push(viapoint_time);
        fields.push(self.viapoint_radius);
        fields.extend(self.goal.iter());
        fields.push(self.goal_time);
        fields.push(self.viapoint_weight);
        fields.push(self.acceleration_weight);
        fields.push(self.goal_weight);

        let record = fields
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<String>>()
            .join(" ");
        std::fs::write(path, record)?;

        Ok(())
    }

    /// Read a task from a single-row numeric record written by
    /// [`TaskViapoint::write_to_file`].
    ///
    /// The dimensionality is inferred from the field count as
    /// `(fields - 6) / 2`. A negative stored viapoint time decodes to
    /// minimum-distance mode.
    pub fn read_from_file(path: &std::path::Path) -> Result<Self, TaskError> {
        let contents = std::fs::read_to_string(path)?;

        let mut fields: Vec<f64> = Vec::new();
        for (i, token) in contents.split_whitespace().enumerate() {
            fields.push(token.parse().map_err(|_| TaskError::ParseField(i))?);
        }

        if fields.len() < 8 || (fields.len() - 6) % 2 != 0 {
            return Err(TaskError::FieldCountMismatch(fields.len()));
        }
        let n_dims = (fields.len() - 6) / 2;

        let viapoint = DVector::from_vec(fields[0..n_dims].to_vec());
        let viapoint_time = if fields[n_dims] < 0.0 {
            ViapointTime::AtMinimumDistance
        } else {
            ViapointTime::AtTime(fields[n_dims])
        };
        let viapoint_radius = fields[n_dims + 1];
        let goal = DVector::from_vec(fields[(n_dims + 2)..(2 * n_dims + 2)].to_vec());
        let goal_time = fields[2 * n_dims + 2];
        let viapoint_weight = fields[2 * n_dims + 3];
        let acceleration_weight = fields[2 * n_dims + 4];
        let goal_weight = fields[2 * n_dims + 5];

        Self::with_weights(
            viapoint,
            viapoint_time,
            viapoint_radius,
            goal,
            goal_time,
            viapoint_weight,
            acceleration_weight,
            goal_weight,
        )
    }
}

impl Task for TaskViapoint {
    /// Evaluate a rollout by unpacking its position and acceleration columns
    /// and computing the cost vector. The velocity and forcing columns are
    /// present in the layout but unused by this task.
    fn evaluate_rollout(
        &self,
        rollout: &Rollout,
        _sample: &DVector<f64>,
        _task_parameters: &DVector<f64>,
    ) -> Result<DVector<f64>, TaskError> {
        if rollout.n_dims() != self.n_dims() {
            return Err(TaskError::RolloutDimMismatch {
                expected: self.n_dims(),
                found: rollout.n_dims(),
            });
        }

        self.compute_costs(&rollout.ts(), &rollout.positions(), &rollout.accelerations())
    }

    fn n_cost_components(&self) -> usize {
        N_COST_COMPONENTS
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
