//! # Viapoint task parameters
//!
//! Parameter file layout for [`crate::TaskViapoint`], loaded with
//! [`util::params::load`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Viapoint task parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// The intermediate point the trajectory should pass through
    pub viapoint: Vec<f64>,

    /// The time at which the distance to the viapoint is evaluated. If
    /// absent the minimum distance over the whole trajectory is used
    /// instead.
    pub viapoint_time: Option<f64>,

    /// Radius around the viapoint within which the viapoint cost is zero
    pub viapoint_radius: f64,

    /// The terminal goal point
    pub goal: Vec<f64>,

    /// The time by which the trajectory should have settled on the goal
    pub goal_time: f64,

    /// Weight of the viapoint cost component
    pub viapoint_weight: f64,

    /// Weight of the acceleration cost component
    pub acceleration_weight: f64,

    /// Weight of the goal-delay cost component
    pub goal_weight: f64,
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::task::Task;
    use crate::viapoint::TaskViapoint;

    #[test]
    fn test_load_params() {
        let file = "
            viapoint = [1.0, -1.0]
            viapoint_time = 2.0
            viapoint_radius = 0.25
            goal = [2.0, 0.5]
            goal_time = 5.0
            viapoint_weight = 1.0
            acceleration_weight = 0.0001
            goal_weight = 1.0
        ";

        let path = std::env::temp_dir().join("task_viapoint_params.toml");
        std::fs::write(&path, file).unwrap();

        let params: Params = util::params::load(&path).unwrap();
        assert_eq!(params.viapoint, vec![1.0, -1.0]);
        assert_eq!(params.viapoint_time, Some(2.0));

        let task = TaskViapoint::from_params(&params).unwrap();
        assert_eq!(task.n_dims(), 2);
        assert_eq!(task.n_cost_components(), 3);
    }

    #[test]
    fn test_absent_time_is_minimum_distance() {
        let file = "
            viapoint = [0.5]
            viapoint_radius = 0.0
            goal = [1.0]
            goal_time = -1.0
            viapoint_weight = 1.0
            acceleration_weight = 0.0
            goal_weight = 0.0
        ";

        let path = std::env::temp_dir().join("task_viapoint_params_min_dist.toml");
        std::fs::write(&path, file).unwrap();

        let params: Params = util::params::load(&path).unwrap();
        assert_eq!(params.viapoint_time, None);

        let task = TaskViapoint::from_params(&params).unwrap();
        let ts = util::maths::linspace(0.0, 1.0, 5);
        let y = nalgebra::DMatrix::from_fn(5, 1, |i, _| 0.25 * (i as f64));
        let ydd = nalgebra::DMatrix::zeros(5, 1);

        // Closest approach to 0.5 is exact, so the cost is zero
        let costs = task.compute_costs(&ts, &y, &ydd).unwrap();
        assert_eq!(costs[0], 0.0);
    }
}
