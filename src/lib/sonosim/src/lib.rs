//! Steady-state acoustic levitation field simulator.
//!
//! Computes the complex pressure field of an ultrasonic transducer array,
//! the Gor'kov acoustic potential and the radiation force on a small
//! spherical probe particle, on a regular 3-D cartesian grid.
//!
//! UNIT SYSTEM: SI THROUGHOUT
//! ==========================
//! Distance: meter (m)
//! Frequency: hertz (Hz)
//! Density: kg/m³
//! Wave speed: m/s
//! Pressure: complex amplitude, scale defined by the caller's output_power
//! Potential: Gor'kov potential [J]
//! Force: N
//!
//! The pipeline is three data-parallel stages run strictly in order, each
//! reading only its predecessor's grid:
//!
//! pressure (complex, +2 halo) → potential (real, +1 halo) → force (real)
//!
//! followed by binary export of all grids plus a JSON metadata manifest.
//! Grid nesting guarantees that the centered differences taken by the
//! potential and force stages are defined at every cell.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::info;

pub mod error;
pub mod export;
pub mod grid;
pub mod parameter;
pub mod progress;
pub mod step;
pub mod transducer;
pub mod vec3;

pub use error::StartError;
pub use export::ExportMetadata;
pub use grid::{CellBlock, CellId, Interpolation};
pub use parameter::SimulationParameter;
pub use progress::{AtomicLogger, Progress};
pub use step::{ForceField, GridLayout};
pub use transducer::Transducer;
pub use vec3::Vec3;

/// Run the full pipeline on the calling thread and emit the result files
/// into `export_directory` (created if missing).
///
/// Expects validated inputs; [`start_simulation`] is the checked entry
/// point. Stage progress is appended to the progress log. On I/O failure
/// partial files may remain in the export directory.
pub fn run_simulation(
    progress: &Progress,
    export_directory: &Path,
    transducers: &[Transducer],
    parameter: &SimulationParameter,
) -> io::Result<()> {
    let log = &progress.log;
    log.log("Simulation started");

    std::fs::create_dir_all(export_directory)?;

    let layout = GridLayout::from_parameter(parameter);
    info!(
        pressure_cells = layout.pressure.get_cell_count(),
        transducers = transducers.len(),
        "starting pipeline"
    );

    log.log("Calculating direct pressure from transducers");
    let pressure = step::compute_pressure(transducers, parameter, &layout.pressure);
    log.log("Pressure stage done");

    log.log("Calculating potential from pressure complex");
    let potential =
        step::compute_potential(&pressure, &layout.pressure, &layout.potential, parameter);
    log.log("Potential stage done");

    log.log("Calculating force from potential");
    let force = step::compute_force(&potential, &layout.potential, &layout.force, parameter);
    log.log("Force stage done");

    log.log("Exporting results");
    export::write_block(export_directory, export::PRESSURE_FILE, &pressure)?;
    drop(pressure);
    export::write_block(export_directory, export::POTENTIAL_FILE, &potential)?;
    drop(potential);
    export::write_block(export_directory, export::FORCE_X_FILE, &force.x)?;
    export::write_block(export_directory, export::FORCE_Y_FILE, &force.y)?;
    export::write_block(export_directory, export::FORCE_Z_FILE, &force.z)?;

    let metadata = ExportMetadata::from_layout(&layout);
    export::write_metadata(export_directory, &metadata)?;

    log.log("Simulation done");
    Ok(())
}

/// Validate the inputs and launch one simulation job on a worker thread.
///
/// Rejection is synchronous and side-effect free: on any `Err` the running
/// flag stays false and nothing is written. On `Ok` the running flag is
/// already true; it returns to false when the worker finishes, succeeds or
/// not. Runtime failures inside the worker are reported through the
/// progress log only.
pub fn start_simulation(
    progress: Arc<Progress>,
    export_directory: PathBuf,
    transducers: Vec<Transducer>,
    parameter: SimulationParameter,
) -> Result<JoinHandle<()>, StartError> {
    if transducers.is_empty() {
        return Err(StartError::EmptyTransducerList);
    }
    for transducer in &transducers {
        transducer
            .validate()
            .map_err(|message| StartError::InvalidTransducer {
                id: transducer.id.clone(),
                message,
            })?;
    }
    parameter
        .validate()
        .map_err(|message| StartError::InvalidParameter { message })?;

    if !progress.try_start() {
        return Err(StartError::JobInProgress);
    }

    let worker_progress = progress.clone();
    let handle = thread::Builder::new()
        .name("sonosim-worker".to_string())
        .spawn(move || {
            // Cleared on every exit path, including panics in a stage
            let _job = worker_progress.job_guard();
            worker_progress.log.clear();

            let job_begin = Instant::now();
            match run_simulation(&worker_progress, &export_directory, &transducers, &parameter) {
                Ok(()) => {
                    info!(elapsed = ?job_begin.elapsed(), "simulation finished");
                }
                Err(err) => {
                    info!(error = %err, "simulation failed");
                    worker_progress.log.log(&format!("Simulation failed: {err}"));
                }
            }
        });

    match handle {
        Ok(handle) => Ok(handle),
        Err(err) => {
            // The worker never ran; release the claim taken above
            let _job = progress.job_guard();
            Err(StartError::Spawn(err))
        }
    }
}
