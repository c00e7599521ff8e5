//! # Viapoint Task Demo
//!
//! Loads a viapoint task from a parameter file (or builds a default one),
//! generates a demonstration trajectory, and evaluates its cost.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use color_eyre::{eyre::WrapErr, Result};
use log::info;
use nalgebra::DMatrix;
use std::path::Path;

use mptask::{params::Params, TaskViapoint};
use util::{
    logger::{logger_init, LevelFilter},
    maths::linspace,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Path to the task parameter file.
const PARAMS_PATH: &str = "task_viapoint.toml";

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    // Initialise logger
    logger_init(LevelFilter::Debug, None).wrap_err("Failed to initialise logging")?;

    // ---- LOAD PARAMETERS ----

    let params_path = Path::new(PARAMS_PATH);
    let task = if params_path.exists() {
        let params: Params =
            util::params::load(params_path).wrap_err("Failed to load task parameters")?;
        info!("Loaded task parameters from {:?}", params_path);
        TaskViapoint::from_params(&params).wrap_err("Invalid task parameters")?
    } else {
        info!(
            "No parameter file at {:?}, using the default task",
            params_path
        );
        TaskViapoint::with_goal(
            nalgebra::DVector::from_vec(vec![1.0, -1.0]),
            mptask::ViapointTime::AtTime(1.0),
            nalgebra::DVector::from_vec(vec![2.0, 0.5]),
            2.0,
        )
        .wrap_err("Failed to build the default task")?
    };

    info!("Task is {} dimensional", task.n_dims());

    // ---- DEMONSTRATION ----

    let ts = linspace(0.0, 2.5, 251);
    let via_position = DMatrix::from_row_slice(1, 2, &[1.0, -1.0]);

    let demonstration = task
        .generate_demonstration(&via_position, &ts)
        .wrap_err("Failed to generate the demonstration")?;

    info!(
        "Generated a demonstration with {} samples over {} dimensions",
        demonstration.len(),
        demonstration.dim()
    );

    // ---- COST EVALUATION ----

    let costs = task
        .compute_costs(demonstration.ts(), demonstration.ys(), demonstration.ydds())
        .wrap_err("Failed to evaluate the demonstration")?;

    info!("Costs of the demonstration:");
    info!("    total:        {:.6}", costs[0]);
    info!("    viapoint:     {:.6}", costs[1]);
    info!("    acceleration: {:.6}", costs[2]);
    info!("    goal delay:   {:.6}", costs[3]);

    Ok(())
}
