//! End-to-end runs of the simulation pipeline against analytically known
//! grid shapes, file sizes and symmetries.

use approx::assert_relative_eq;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use sonosim::{
    Progress, SimulationParameter, StartError, Transducer, Vec3, run_simulation,
    start_simulation,
};

fn upward_transducer() -> Transducer {
    Transducer {
        id: "t0".to_string(),
        position: Vec3::new(0.0, 0.0, 0.0),
        target: Vec3::new(0.0, 0.0, 1.0),
        radius: 5e-3,
        phase_shift: 0.0,
        loss_factor: 1.0,
        output_power: 1.0,
        frequency: None,
    }
}

fn levitation_parameter() -> SimulationParameter {
    SimulationParameter {
        begin: Vec3::new(-5e-3, -5e-3, 10e-3),
        end: Vec3::new(5e-3, 5e-3, 20e-3),
        cell_size: 5e-3,
        frequency: 40_000.0,
        air_density: 1.225,
        air_wave_speed: 340.0,
        particle_radius: 1e-3,
        particle_density: 0.0,
        particle_wave_speed: 0.0,
        assume_large_particle_density: true,
    }
}

fn read_doubles(path: &Path) -> Vec<f64> {
    let bytes = fs::read(path).unwrap();
    bytes
        .chunks_exact(8)
        .map(|chunk| f64::from_ne_bytes(chunk.try_into().unwrap()))
        .collect()
}

#[test]
fn single_transducer_emits_all_result_files() {
    let progress = Progress::new();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("result");

    run_simulation(
        &progress,
        &out,
        &[upward_transducer()],
        &levitation_parameter(),
    )
    .unwrap();

    // force 3³, potential 5³, pressure 7³ cells
    assert_eq!(
        fs::metadata(out.join("pressure_result.bin")).unwrap().len(),
        16 * 343
    );
    assert_eq!(
        fs::metadata(out.join("potential_result.bin")).unwrap().len(),
        8 * 125
    );
    for name in [
        "force_x_result.bin",
        "force_y_result.bin",
        "force_z_result.bin",
    ] {
        assert_eq!(fs::metadata(out.join(name)).unwrap().len(), 8 * 27);
    }

    // Sampling region is clear of the transducer, so every value is finite
    let potential = read_doubles(&out.join("potential_result.bin"));
    assert!(potential.iter().all(|u| u.is_finite()));
    let pressure = read_doubles(&out.join("pressure_result.bin"));
    assert!(pressure.iter().all(|p| p.is_finite()));

    let log = progress.log.read();
    assert!(log.contains("Simulation started"));
    assert!(log.contains("Simulation done"));
}

#[test]
fn metadata_matches_file_sizes_and_grid_nesting() {
    let progress = Progress::new();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("result");
    let sp = levitation_parameter();

    run_simulation(&progress, &out, &[upward_transducer()], &sp).unwrap();

    let metadata: Value =
        serde_json::from_str(&fs::read_to_string(out.join("metadata.json")).unwrap()).unwrap();
    assert_eq!(metadata["version"], 1);

    let count = |key: &str| -> u64 {
        (0..3)
            .map(|axis| metadata[key][axis].as_u64().unwrap())
            .product()
    };
    assert_eq!(
        fs::metadata(out.join("pressure_result.bin")).unwrap().len(),
        16 * count("pressure_cnt")
    );
    assert_eq!(
        fs::metadata(out.join("potential_result.bin")).unwrap().len(),
        8 * count("potential_cnt")
    );
    assert_eq!(
        fs::metadata(out.join("force_x_result.bin")).unwrap().len(),
        8 * count("force_cnt")
    );

    // Nested counts differ by two cells per axis, bounds by one cell size
    for axis in 0..3 {
        let force_cnt = metadata["force_cnt"][axis].as_u64().unwrap();
        assert_eq!(
            metadata["potential_cnt"][axis].as_u64().unwrap(),
            force_cnt + 2
        );
        assert_eq!(
            metadata["pressure_cnt"][axis].as_u64().unwrap(),
            force_cnt + 4
        );

        let force_beg = metadata["force_beg"][axis].as_f64().unwrap();
        let potential_beg = metadata["potential_beg"][axis].as_f64().unwrap();
        let pressure_beg = metadata["pressure_beg"][axis].as_f64().unwrap();
        assert_relative_eq!(potential_beg, force_beg - sp.cell_size, max_relative = 1e-12);
        assert_relative_eq!(
            pressure_beg,
            force_beg - 2.0 * sp.cell_size,
            max_relative = 1e-12
        );
    }
    assert_eq!(metadata["force_beg"][0].as_f64().unwrap(), -5e-3);
}

#[test]
fn opposing_transducers_cancel_at_the_center() {
    let progress = Progress::new();
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("result");

    let mut below = upward_transducer();
    below.id = "below".to_string();
    below.position = Vec3::new(0.0, 0.0, -10e-3);
    below.target = Vec3::new(0.0, 0.0, 0.0);

    let mut above = upward_transducer();
    above.id = "above".to_string();
    above.position = Vec3::new(0.0, 0.0, 10e-3);
    above.target = Vec3::new(0.0, 0.0, 0.0);

    // Sampling region centered on the origin so the middle force cell sits
    // exactly between the sources
    let mut sp = levitation_parameter();
    sp.begin = Vec3::new(-5e-3, -5e-3, -5e-3);
    sp.end = Vec3::new(5e-3, 5e-3, 5e-3);

    run_simulation(&progress, &out, &[below, above], &sp).unwrap();

    let force_z = read_doubles(&out.join("force_z_result.bin"));
    assert_eq!(force_z.len(), 27);

    // Center cell (1,1,1) of the 3³ force grid
    let center = force_z[1 * 9 + 1 * 3 + 1];
    let scale = force_z.iter().fold(0.0f64, |m, f| m.max(f.abs()));
    assert!(scale > 0.0);
    assert!(
        center.abs() <= 1e-9 * scale,
        "axial force at the origin should cancel by symmetry, got {center} (scale {scale})"
    );

    // Potential is symmetric under z → −z across the central plane
    let potential = read_doubles(&out.join("potential_result.bin"));
    let n = 5;
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let here = potential[i * n * n + j * n + k];
                let mirrored = potential[i * n * n + j * n + (n - 1 - k)];
                assert_relative_eq!(here, mirrored, max_relative = 1e-9);
            }
        }
    }
}

#[test]
fn parameter_violation_rejects_the_job_without_side_effects() {
    let progress = Arc::new(Progress::new());
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("never_created");

    let mut sp = levitation_parameter();
    sp.cell_size = 0.0;
    assert_eq!(sp.validate(), Err("Cell size is not positive".to_string()));

    let result = start_simulation(
        progress.clone(),
        out.clone(),
        vec![upward_transducer()],
        sp,
    );
    match result {
        Err(StartError::InvalidParameter { message }) => {
            assert_eq!(message, "Cell size is not positive");
        }
        _ => panic!("expected parameter rejection"),
    }

    assert!(!progress.is_running());
    assert!(!out.exists());
}

#[test]
fn identical_inputs_reproduce_identical_bytes() {
    let progress = Progress::new();
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    let transducers = [upward_transducer()];
    let sp = levitation_parameter();

    run_simulation(&progress, &first, &transducers, &sp).unwrap();
    run_simulation(&progress, &second, &transducers, &sp).unwrap();

    for name in [
        "pressure_result.bin",
        "potential_result.bin",
        "force_x_result.bin",
        "force_y_result.bin",
        "force_z_result.bin",
        "metadata.json",
    ] {
        assert_eq!(
            fs::read(first.join(name)).unwrap(),
            fs::read(second.join(name)).unwrap(),
            "{name} differs between identical runs"
        );
    }
}

#[test]
fn worker_thread_runs_the_job_to_completion() {
    let progress = Arc::new(Progress::new());
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("threaded");

    let handle = start_simulation(
        progress.clone(),
        out.clone(),
        vec![upward_transducer()],
        levitation_parameter(),
    )
    .unwrap();
    handle.join().unwrap();

    assert!(!progress.is_running());
    for name in [
        "pressure_result.bin",
        "potential_result.bin",
        "force_x_result.bin",
        "force_y_result.bin",
        "force_z_result.bin",
        "metadata.json",
    ] {
        assert!(out.join(name).exists(), "{name} missing after job");
    }
    assert!(progress.log.read().contains("Simulation done"));
}
